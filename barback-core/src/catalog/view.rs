//! Derived, paginated view over the collection
//!
//! Everything here is a pure function of its inputs so the same state
//! always renders the same page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::Record;
use super::store::LoadStatus;

/// Which records the view includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Favorites,
}

impl Filter {
    pub fn includes(self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::Favorites => record.liked,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Favorites => f.write_str("favorites"),
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "favorites" | "favourites" | "fav" | "liked" => Ok(Filter::Favorites),
            other => Err(format!("Unknown filter '{other}' (expected: all, favorites)")),
        }
    }
}

/// One page of the filtered collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a> {
    /// Records on the current page, in display order
    pub items: Vec<&'a Record>,

    /// Size of the filtered set
    pub total_count: usize,

    /// Always at least 1
    pub total_pages: usize,

    /// Requested page clamped to `1..=total_pages`
    pub page: usize,
}

impl PageSlice<'_> {
    /// Page numbers for a pager; empty when there is nothing to page through
    pub fn page_numbers(&self) -> Vec<usize> {
        if self.total_pages <= 1 {
            return Vec::new();
        }
        (1..=self.total_pages).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `records` into the requested page.
///
/// A zero `page_size` is treated as 1 and a zero `page` as the first page.
pub fn visible(records: &[Record], filter: Filter, page: usize, page_size: usize) -> PageSlice<'_> {
    let page_size = page_size.max(1);
    let base: Vec<&Record> = records.iter().filter(|r| filter.includes(r)).collect();

    let total_count = base.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let items = base.into_iter().skip(start).take(page_size).collect();

    PageSlice {
        items,
        total_count,
        total_pages,
        page,
    }
}

/// Why a rendered page has nothing to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// A search is active and nothing matched
    NoSearchMatches(String),
    /// Favorites filter with no liked records
    NoFavorites,
    /// Nothing loaded or created yet
    EmptyCatalog,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoSearchMatches(query) => {
                write!(f, "No products match your search criteria \"{query}\"")
            }
            EmptyReason::NoFavorites => {
                f.write_str("You haven't added any products to favorites yet")
            }
            EmptyReason::EmptyCatalog => f.write_str("There are no products in the catalog yet"),
        }
    }
}

/// Everything the presentation layer needs to render the list
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    pub slice: PageSlice<'a>,
    pub filter: Filter,
    pub search: &'a str,
    pub status: LoadStatus,
    pub error: Option<&'a str>,
}

impl CatalogView<'_> {
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Explanation for an empty filtered set, if it is empty
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if self.slice.total_count > 0 {
            return None;
        }

        let query = self.search.trim();
        if !query.is_empty() {
            Some(EmptyReason::NoSearchMatches(query.to_string()))
        } else if self.filter == Filter::Favorites {
            Some(EmptyReason::NoFavorites)
        } else {
            Some(EmptyReason::EmptyCatalog)
        }
    }

    /// Short status line, e.g. "25 items"
    pub fn summary(&self) -> String {
        if self.is_loading() {
            "Loading...".to_string()
        } else {
            format!("{} items", self.slice.total_count)
        }
    }
}
