//! Barback Catalog - merged remote and local cocktail records
//!
//! This module holds the in-memory catalog that a browsing session works
//! against.
//!
//! # Overview
//!
//! The catalog lets a user:
//! - Browse records fetched from the remote provider by first letter
//! - Search the remote catalog while keeping their own records visible
//! - Create, edit, like and delete records locally
//! - Page through the collection, optionally limited to favorites
//!
//! # Architecture
//!
//! ```text
//! Remote provider (fetch by prefix / search / fetch by id)
//!        │  raw records
//!        ▼
//! CatalogStore ◄── local commands (create, update, like, remove, edit)
//!        │
//!        ▼
//! visible()  → CatalogView (page items, totals, clamped page)
//! ```

mod record;
mod store;
mod view;

pub use record::{
    DraftError, DraftField, Record, RecordChanges, RecordDraft, RecordId, MIN_DESCRIPTION_LEN,
    MIN_TITLE_LEN,
};
pub use store::{CatalogStore, LoadStatus, SearchTicket, DEFAULT_PAGE_SIZE};
pub use view::{visible, CatalogView, EmptyReason, Filter, PageSlice};
