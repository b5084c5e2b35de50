//! Test helpers shared by the integration tests
//!
//! Provides an in-memory provider with canned responses, per-call delays
//! and a call log, plus one-time tracing setup.

#![allow(dead_code)]

use async_trait::async_trait;
use barback_core::provider::{CatalogProvider, ProviderError, RawRecord};
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Shorthand for a raw provider record
pub fn raw(id: &str, name: &str) -> RawRecord {
    RawRecord {
        instructions: Some(format!("Make a {name}.")),
        category: Some("Cocktail".to_string()),
        ..RawRecord::new(id, name)
    }
}

/// Canned provider keyed by prefix, query and id
#[derive(Default)]
pub struct FakeProvider {
    pub by_prefix: HashMap<String, Vec<RawRecord>>,
    pub by_query: HashMap<String, Vec<RawRecord>>,
    pub by_id: HashMap<String, RawRecord>,
    pub categories: Vec<String>,
    /// Keys ("f:a", "s:mar", "i:1") that fail with HTTP 500
    pub failing: Vec<String>,
    /// Artificial latency per key
    pub delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, letter: &str, records: Vec<RawRecord>) -> Self {
        self.by_prefix.insert(letter.to_string(), records);
        self
    }

    pub fn with_query(mut self, query: &str, records: Vec<RawRecord>) -> Self {
        self.by_query.insert(query.to_string(), records);
        self
    }

    pub fn with_id(mut self, record: RawRecord) -> Self {
        self.by_id.insert(record.id.clone(), record);
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.push(key.to_string());
        self
    }

    pub fn delayed(mut self, key: &str, millis: u64) -> Self {
        self.delays
            .insert(key.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, key: String) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(key.clone());

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&key) {
            return Err(ProviderError::Status {
                status: 500,
                url: format!("fake://{key}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for FakeProvider {
    async fn fetch_by_prefix(&self, letter: &str) -> Result<Vec<RawRecord>, ProviderError> {
        self.enter(format!("f:{letter}")).await?;
        Ok(self.by_prefix.get(letter).cloned().unwrap_or_default())
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<RawRecord>, ProviderError> {
        self.enter(format!("s:{query}")).await?;
        Ok(self.by_query.get(query).cloned().unwrap_or_default())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawRecord>, ProviderError> {
        self.enter(format!("i:{id}")).await?;
        Ok(self.by_id.get(id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ProviderError> {
        self.enter("c:list".to_string()).await?;
        Ok(self.categories.clone())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
