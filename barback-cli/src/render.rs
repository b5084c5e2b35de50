//! Table and detail rendering for catalog views

use std::io::Write;

use anyhow::Result;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use barback_core::catalog::{CatalogView, Record};

const DESCRIPTION_WIDTH: usize = 50;

/// Table row for a record on the current page
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Fav")]
    liked: String,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            category: record.category.clone().unwrap_or_default(),
            liked: if record.liked { "*" } else { "" }.to_string(),
            origin: record.origin().to_string(),
            description: truncate(record.short_description(), DESCRIPTION_WIDTH),
        }
    }
}

/// Cut to `width` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Render the current page with a status line and pager
pub fn write_view(out: &mut impl Write, view: &CatalogView<'_>) -> Result<()> {
    let mut status = format!("[{}] {}", view.filter, view.summary());
    if !view.search.is_empty() {
        status.push_str(&format!(" matching \"{}\"", view.search));
    }
    writeln!(out, "{status}")?;

    if let Some(error) = view.error {
        writeln!(out, "Last fetch failed: {error}")?;
    }

    if let Some(reason) = view.empty_reason() {
        writeln!(out, "\n{reason}")?;
        return Ok(());
    }

    let rows: Vec<RecordRow> = view.slice.items.iter().map(|r| RecordRow::from(*r)).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    writeln!(out, "{table}")?;

    let pages = view.slice.page_numbers();
    if !pages.is_empty() {
        let pager: Vec<String> = pages
            .iter()
            .map(|p| {
                if *p == view.slice.page {
                    format!("[{p}]")
                } else {
                    p.to_string()
                }
            })
            .collect();
        writeln!(out, "Pages: {}", pager.join(" "))?;
    }

    Ok(())
}

/// Render a single record in full
pub fn write_record(out: &mut impl Write, record: &Record) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{} ({})", record.title, record.id)?;
    if let Some(category) = &record.category {
        writeln!(out, "Category: {category}")?;
    }
    if let Some(image) = &record.image {
        writeln!(out, "Image:    {image}")?;
    }
    writeln!(out, "Origin:   {}", record.origin())?;
    writeln!(out, "Favorite: {}", if record.liked { "yes" } else { "no" })?;

    writeln!(out)?;
    if record.description.is_empty() {
        writeln!(out, "No description")?;
    } else {
        for line in record.description.lines() {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use barback_core::catalog::{CatalogStore, Filter, RecordDraft};

    fn render(store: &CatalogStore) -> String {
        let mut out = Vec::new();
        write_view(&mut out, &store.view()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Crème de cassis liqueur", 10), "Crème d...");
    }

    #[test]
    fn test_write_view_lists_records() {
        let mut store = CatalogStore::new(2);
        store.ingest_batch(vec![
            Record::new("1", "Aviation"),
            Record::new("2", "Bramble"),
            Record::new("3", "Clover Club"),
        ]);
        store.toggle_like("2");

        let text = render(&store);
        assert!(text.contains("[all] 3 items"));
        assert!(text.contains("Aviation"));
        assert!(text.contains("Bramble"));
        assert!(!text.contains("Clover Club"));
        assert!(text.contains("Pages: [1] 2"));
    }

    #[test]
    fn test_write_view_empty_states() {
        let mut store = CatalogStore::default();
        assert!(render(&store).contains("no products in the catalog"));

        store.create(RecordDraft::new("Spritz", "Aperol and prosecco"));
        store.set_filter(Filter::Favorites);
        assert!(render(&store).contains("haven't added any products to favorites"));

        store.set_search("zzz");
        assert!(render(&store).contains("No products match your search criteria \"zzz\""));
    }

    #[test]
    fn test_write_record_without_description() {
        let mut out = Vec::new();
        write_record(&mut out, &Record::new("9", "Mystery")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Mystery (9)"));
        assert!(text.contains("No description"));
    }
}
