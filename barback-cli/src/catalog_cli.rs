//! One-shot catalog commands
//!
//! Each command builds a fresh session, performs its fetches and prints
//! the result. Nothing outlives the process.

use anyhow::{Context, Result};

use barback_core::catalog::Record;
use barback_core::provider::CocktailDbProvider;
use barback_core::{BarbackConfig, CatalogSession};

use crate::render::{write_record, write_view};

/// Build a session against the configured remote provider
pub fn open_session(config: &BarbackConfig) -> Result<CatalogSession<CocktailDbProvider>> {
    let provider =
        CocktailDbProvider::new(&config.provider).context("Failed to set up catalog provider")?;
    Ok(CatalogSession::new(provider, &config.browse))
}

fn record_json(record: &Record) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "title": record.title,
        "description": record.description,
        "category": record.category,
        "image": record.image,
        "liked": record.liked,
        "created": record.created,
    })
}

pub async fn execute_search(
    config: &BarbackConfig,
    query: Option<&str>,
    page: usize,
    page_size: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let mut session = open_session(config)?;

    match query {
        Some(q) => {
            eprintln!("Searching catalog for \"{q}\"...");
            session.search(q).await;
        }
        None => {
            eprintln!(
                "Fetching catalog ({})...",
                config.browse.initial_letters.join(", ")
            );
            session.load_initial().await;
        }
    }

    let store = session.store_mut();
    if let Some(size) = page_size {
        store.set_page_size(size);
    }
    store.set_page(page);

    let view = session.store().view();
    if let Some(error) = view.error {
        if view.slice.total_count == 0 {
            anyhow::bail!("Catalog fetch failed: {error}");
        }
    }

    if json_output {
        let output = serde_json::json!({
            "page": view.slice.page,
            "total_pages": view.slice.total_pages,
            "total_count": view.slice.total_count,
            "items": view.slice.items.iter().map(|r| record_json(r)).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        write_view(&mut std::io::stdout().lock(), &view)?;
    }

    Ok(())
}

pub async fn execute_show(config: &BarbackConfig, id: &str, json_output: bool) -> Result<()> {
    let mut session = open_session(config)?;

    let record = session
        .open(id)
        .await
        .with_context(|| format!("Record '{id}' not found in catalog"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
    } else {
        write_record(&mut std::io::stdout().lock(), &record)?;
    }

    Ok(())
}

pub async fn execute_categories(config: &BarbackConfig) -> Result<()> {
    let session = open_session(config)?;

    let categories = session
        .categories()
        .await
        .context("Failed to fetch categories")?;

    if categories.is_empty() {
        println!("No categories available.");
        return Ok(());
    }

    println!("Categories:\n");
    for category in categories {
        println!("  {category}");
    }
    Ok(())
}
