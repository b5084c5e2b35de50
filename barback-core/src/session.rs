//! Catalog session - drives remote fetches into a single store
//!
//! A session owns exactly one [`CatalogStore`] and one provider. Fetches
//! run concurrently where the flow allows it, but every completion is
//! applied to the store as one discrete step in completion order.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogStore, Filter, Record};
use crate::config::BrowseSettings;
use crate::provider::{into_records, CatalogProvider, ProviderError};

/// A browsing session over one provider
pub struct CatalogSession<P> {
    store: CatalogStore,
    provider: P,
    initial_letters: Vec<String>,
}

impl<P: CatalogProvider> CatalogSession<P> {
    pub fn new(provider: P, settings: &BrowseSettings) -> Self {
        Self {
            store: CatalogStore::new(settings.page_size),
            provider,
            initial_letters: settings.initial_letters.clone(),
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Direct access for local commands
    pub fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Populate the catalog with every configured initial letter.
    ///
    /// The letters are fetched concurrently; each result is merged as it
    /// arrives, so a failure for one letter does not lose the others.
    pub async fn load_initial(&mut self) {
        let Self {
            store,
            provider,
            initial_letters,
        } = self;
        let provider = &*provider;

        if initial_letters.is_empty() {
            debug!("No initial letters configured");
            return;
        }

        store.begin_fetch();
        let mut pending: FuturesUnordered<_> = initial_letters
            .iter()
            .map(|letter| async move { (letter, provider.fetch_by_prefix(letter).await) })
            .collect();

        while let Some((letter, result)) = pending.next().await {
            match result {
                Ok(raws) => {
                    debug!("Prefix '{}' returned {} records", letter, raws.len());
                    store.ingest_batch(into_records(raws));
                }
                Err(e) => {
                    warn!("Prefix '{}' failed via {}: {}", letter, provider.name(), e);
                    store.fail_fetch(e.to_string());
                }
            }
        }
    }

    /// Set the search text and query the provider.
    ///
    /// An empty query reloads the initial browse data instead, and
    /// supersedes any search still in flight.
    ///
    /// Searches through one session run one at a time since this holds
    /// `&mut self`; the store's ticket guards callers that drive
    /// [`CatalogStore::begin_search`] directly with overlapping requests.
    pub async fn search(&mut self, query: &str) {
        self.store.set_search(query);

        let query = query.trim();
        if query.is_empty() {
            self.store.cancel_searches();
            self.load_initial().await;
            return;
        }

        let ticket = self.store.begin_search();
        info!("Searching {} for '{}'", self.provider.name(), query);
        let outcome = self
            .provider
            .search_by_text(query)
            .await
            .map(into_records);
        self.store.complete_search(ticket, outcome);
    }

    /// Drop the search text and favorites filter, then reload browse data
    pub async fn clear_search(&mut self) {
        self.store.set_search("");
        self.store.set_filter(Filter::All);
        self.store.cancel_searches();
        self.load_initial().await;
    }

    /// Resolve a record for a detail view.
    ///
    /// Known ids are served from the store; unknown ids are fetched and
    /// merged without overwriting anything. A failed lookup is logged and
    /// treated as not found.
    pub async fn open(&mut self, id: &str) -> Option<Record> {
        if let Some(record) = self.store.get(id) {
            return Some(record.clone());
        }

        match self.provider.fetch_by_id(id).await {
            Ok(raw) => {
                self.store.ingest_single(raw.map(Record::from));
                self.store.get(id).cloned()
            }
            Err(e) => {
                warn!("Lookup of {} failed: {}", id, e);
                None
            }
        }
    }

    /// Categories offered for new records
    pub async fn categories(&self) -> Result<Vec<String>, ProviderError> {
        self.provider.list_categories().await
    }
}
