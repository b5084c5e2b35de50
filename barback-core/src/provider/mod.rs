//! Remote catalog provider - abstraction over the read-only data source
//!
//! This trait allows swapping between different sources:
//! - TheCocktailDB (HTTP API)
//! - In-memory fakes (testing)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Record;

#[cfg(feature = "cocktaildb")]
pub mod cocktaildb;

#[cfg(feature = "cocktaildb")]
pub use cocktaildb::CocktailDbProvider;

/// Errors from a remote fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// A record as the provider returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "idDrink")]
    pub id: String,

    #[serde(rename = "strDrink")]
    pub name: String,

    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,

    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,

    #[serde(rename = "strDrinkThumb", default)]
    pub thumbnail: Option<String>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instructions: None,
            category: None,
            thumbnail: None,
        }
    }
}

/// Remote records never carry local flags
impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Record {
            id: raw.id,
            title: raw.name,
            description: raw.instructions.unwrap_or_default(),
            category: raw.category,
            image: raw.thumbnail,
            liked: false,
            created: false,
            deleted: false,
        }
    }
}

/// Convert a provider batch into records
pub fn into_records(raws: Vec<RawRecord>) -> Vec<Record> {
    raws.into_iter().map(Record::from).collect()
}

/// Trait for remote catalog providers
///
/// Implementations handle transport, timeouts and decoding; they never
/// touch the store.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Records whose name starts with `letter`
    async fn fetch_by_prefix(&self, letter: &str) -> Result<Vec<RawRecord>, ProviderError>;

    /// Full-text search by name.
    ///
    /// An empty query yields an empty list; callers should load the
    /// default browse data instead.
    async fn search_by_text(&self, query: &str) -> Result<Vec<RawRecord>, ProviderError>;

    /// A single record, or `None` when the provider does not know the id
    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawRecord>, ProviderError>;

    /// Category names offered by the provider
    async fn list_categories(&self) -> Result<Vec<String>, ProviderError>;

    /// Provider identifier for logging
    fn name(&self) -> &'static str;
}
