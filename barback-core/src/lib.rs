//! Barback core library
//!
//! An in-memory cocktail catalog that merges a remote provider with
//! locally created records.

pub mod catalog;
pub mod config;
pub mod provider;
pub mod session;

pub use catalog::{CatalogStore, Filter, LoadStatus, Record, RecordChanges, RecordDraft};
pub use config::BarbackConfig;
pub use provider::{CatalogProvider, ProviderError, RawRecord};
pub use session::CatalogSession;
