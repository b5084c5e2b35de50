//! TheCocktailDB provider
//!
//! Implements the CatalogProvider trait using TheCocktailDB's JSON API.
//! Every endpoint answers `{"drinks": [...]}`, with `null` for no match.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{CatalogProvider, ProviderError, RawRecord};
use crate::config::ProviderConfig;

/// Response envelope shared by all endpoints
#[derive(Debug, Deserialize)]
struct DrinksEnvelope<T> {
    drinks: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    #[serde(rename = "strCategory")]
    category: String,
}

/// HTTP backend for TheCocktailDB
pub struct CocktailDbProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CocktailDbProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("barback/", env!("CARGO_PKG_VERSION")))
            .timeout(config.effective_timeout())
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_drinks<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, ProviderError> {
        let url = self.endpoint(path);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await.map_err(|e| ProviderError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        decode_drinks(&body).map_err(|message| ProviderError::Decode { url, message })
    }
}

/// Decode a `{"drinks": ...}` body; `null` or a missing key is an empty list
fn decode_drinks<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, String> {
    // Some endpoints answer an empty body instead of `{"drinks": null}`
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let envelope: DrinksEnvelope<T> = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(envelope.drinks.unwrap_or_default())
}

#[async_trait]
impl CatalogProvider for CocktailDbProvider {
    async fn fetch_by_prefix(&self, letter: &str) -> Result<Vec<RawRecord>, ProviderError> {
        self.get_drinks("search.php", &[("f", letter)]).await
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<RawRecord>, ProviderError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_drinks("search.php", &[("s", query)]).await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawRecord>, ProviderError> {
        let drinks: Vec<RawRecord> = self.get_drinks("lookup.php", &[("i", id)]).await?;
        Ok(drinks.into_iter().next())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ProviderError> {
        let entries: Vec<CategoryEntry> = self.get_drinks("list.php", &[("c", "list")]).await?;
        Ok(entries.into_iter().map(|e| e.category).collect())
    }

    fn name(&self) -> &'static str {
        "cocktaildb"
    }
}
