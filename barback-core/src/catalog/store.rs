//! The catalog store
//!
//! Owns the merged collection of remote and local records together with
//! the query state (filter, search, page) and the optional editing buffer.
//! Every method is one atomic transition; remote fetch completions and
//! local commands are applied in whatever order the caller delivers them.
//!
//! Reconciliation rules:
//! - batch, single and if-missing ingestion never overwrite a known id
//! - search results replace the remote-origin records but always keep
//!   locally created ones
//! - local commands (update, like, remove, commit) always apply
//! - commands addressing an unknown id are no-ops

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use super::record::{Record, RecordChanges, RecordDraft, RecordId};
use super::view::{visible, CatalogView, Filter};

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Remote fetch lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadStatus::Idle => "idle",
            LoadStatus::Loading => "loading",
            LoadStatus::Succeeded => "succeeded",
            LoadStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Token identifying one issued search.
///
/// Only the most recently issued ticket may apply its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// In-memory catalog state
#[derive(Debug, Clone)]
pub struct CatalogStore {
    items: Vec<Record>,
    status: LoadStatus,
    error: Option<String>,
    filter: Filter,
    search: String,
    page: usize,
    page_size: usize,
    editing: Option<Record>,
    search_generation: u64,
    last_local_id: i64,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Idle,
            error: None,
            filter: Filter::All,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            editing: None,
            search_generation: 0,
            last_local_id: 0,
        }
    }

    // ========================
    // Accessors
    // ========================

    /// Records in display order
    pub fn records(&self) -> &[Record] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Message from the last failed fetch.
    ///
    /// Kept until the next [`begin_fetch`](Self::begin_fetch), so it can sit
    /// beside `Succeeded` when a later batch of the same load arrives.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Stored page number; may exceed the page count until rendered
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Snapshot held by the editing buffer
    pub fn editing(&self) -> Option<&Record> {
        self.editing.as_ref()
    }

    /// Render the current page
    pub fn view(&self) -> CatalogView<'_> {
        CatalogView {
            slice: visible(&self.items, self.filter, self.page, self.page_size),
            filter: self.filter,
            search: &self.search,
            status: self.status,
            error: self.error.as_deref(),
        }
    }

    // ========================
    // Fetch lifecycle
    // ========================

    /// Mark a remote fetch as started
    pub fn begin_fetch(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    /// Record a failed remote fetch. The collection is left untouched.
    pub fn fail_fetch(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Catalog fetch failed: {}", message);
        self.status = LoadStatus::Failed;
        self.error = Some(message);
    }

    /// Issue a new search, superseding any search still in flight
    pub fn begin_search(&mut self) -> SearchTicket {
        self.search_generation += 1;
        self.begin_fetch();
        debug!("Issued search generation {}", self.search_generation);
        SearchTicket(self.search_generation)
    }

    /// Supersede in-flight searches without issuing a new one
    pub fn cancel_searches(&mut self) {
        self.search_generation += 1;
    }

    /// Whether `ticket` belongs to the latest issued search
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.search_generation
    }

    /// Apply the outcome of a ticketed search.
    ///
    /// Returns false when the ticket is stale; the outcome is then dropped,
    /// whether it succeeded or failed.
    pub fn complete_search<E: fmt::Display>(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Record>, E>,
    ) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "Dropping stale search response (generation {}, current {})",
                ticket.0, self.search_generation
            );
            return false;
        }

        match outcome {
            Ok(records) => self.ingest_search_results(records),
            Err(e) => self.fail_fetch(e.to_string()),
        }
        true
    }

    // ========================
    // Remote ingestion
    // ========================

    /// Merge a prefix fetch: append unknown ids, keep every known record as-is
    pub fn ingest_batch(&mut self, records: Vec<Record>) {
        let mut known: HashSet<RecordId> = self.items.iter().map(|r| r.id.clone()).collect();
        let incoming = records.len();
        let mut added = 0;

        for record in records {
            if known.insert(record.id.clone()) {
                self.items.push(record);
                added += 1;
            }
        }

        self.status = LoadStatus::Succeeded;
        info!(
            "Ingested batch: {} new of {} incoming ({} total)",
            added,
            incoming,
            self.items.len()
        );
    }

    /// Replace the remote-origin records with a search result.
    ///
    /// Locally created records stay, in their current order, ahead of the
    /// results. Results sharing an id with a kept record are dropped.
    pub fn ingest_search_results(&mut self, records: Vec<Record>) {
        let mut kept: Vec<Record> = std::mem::take(&mut self.items)
            .into_iter()
            .filter(|r| r.created)
            .collect();
        let preserved = kept.len();

        let mut known: HashSet<RecordId> = kept.iter().map(|r| r.id.clone()).collect();
        for record in records {
            if known.insert(record.id.clone()) {
                kept.push(record);
            } else {
                debug!("Search result {} shadowed by a local record", record.id);
            }
        }

        self.items = kept;
        self.status = LoadStatus::Succeeded;
        info!(
            "Applied search results: {} records ({} local)",
            self.items.len(),
            preserved
        );
    }

    /// Merge a fetch-by-id result. First writer wins for a given id.
    pub fn ingest_single(&mut self, record: Option<Record>) {
        match record {
            Some(record) => self.ingest_if_missing(record),
            None => debug!("Fetch by id returned nothing"),
        }
    }

    /// Append `record` unless its id is already present
    pub fn ingest_if_missing(&mut self, record: Record) {
        if self.contains(&record.id) {
            debug!("Record {} already present, keeping existing", record.id);
            return;
        }
        self.items.push(record);
    }

    // ========================
    // Local commands
    // ========================

    /// Create a local record at the front of the collection.
    ///
    /// No validation happens here. An explicit id that is already taken
    /// replaces the existing record so ids stay unique.
    pub fn create(&mut self, draft: RecordDraft) -> RecordId {
        let id = match draft.id {
            Some(id) => id,
            None => self.next_local_id(),
        };

        if let Some(pos) = self.position(&id) {
            warn!("Create with existing id {} replaces the stored record", id);
            self.items.remove(pos);
        }

        let record = Record {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            image: draft.image,
            liked: false,
            created: true,
            deleted: false,
        };

        info!("Created local record {} ({})", record.id, record.title);
        self.items.insert(0, record);
        id
    }

    /// Overwrite the given fields of a record. Returns false if absent.
    pub fn update(&mut self, id: &str, changes: RecordChanges) -> bool {
        match self.items.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                changes.apply_to(record);
                debug!("Updated record {}", id);
                true
            }
            None => false,
        }
    }

    /// Flip the favorite flag. Returns the new value if the record exists.
    pub fn toggle_like(&mut self, id: &str) -> Option<bool> {
        let record = self.items.iter_mut().find(|r| r.id == id)?;
        record.liked = !record.liked;
        Some(record.liked)
    }

    /// Hard delete
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let pos = self.position(id)?;
        let record = self.items.remove(pos);
        info!("Removed record {} ({})", record.id, record.title);
        Some(record)
    }

    // ========================
    // Editing buffer
    // ========================

    /// Snapshot a record into the editing buffer. Unknown ids are ignored.
    pub fn start_edit(&mut self, id: &str) -> bool {
        match self.get(id) {
            Some(record) => {
                self.editing = Some(record.clone());
                true
            }
            None => false,
        }
    }

    /// Discard the editing buffer
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Merge `changes` onto the buffered snapshot and write it back.
    ///
    /// The buffer is cleared either way. If the record was removed while
    /// editing, nothing is written.
    pub fn commit_edit(&mut self, changes: RecordChanges) -> Option<RecordId> {
        let mut edited = self.editing.take()?;
        changes.apply_to(&mut edited);

        let pos = match self.position(&edited.id) {
            Some(pos) => pos,
            None => {
                warn!("Record {} disappeared while editing; discarding", edited.id);
                return None;
            }
        };

        let id = edited.id.clone();
        self.items[pos] = edited;
        Some(id)
    }

    // ========================
    // Query state
    // ========================

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Store the requested page; clamping to the page count happens on render
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|r| r.id == id)
    }

    /// Millisecond timestamp, bumped past the previous local id and any
    /// id already present
    fn next_local_id(&mut self) -> RecordId {
        let mut candidate = chrono::Utc::now().timestamp_millis().max(self.last_local_id + 1);
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_local_id = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(store: &CatalogStore) -> Vec<&str> {
        store.records().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_new_store_is_idle() {
        let store = CatalogStore::default();
        assert_eq!(store.status(), LoadStatus::Idle);
        assert_eq!(store.page(), 1);
        assert_eq!(store.page_size(), DEFAULT_PAGE_SIZE);
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_keeps_first_writer() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "A")]);
        store.ingest_batch(vec![Record::new("1", "B"), Record::new("2", "C")]);

        assert_eq!(ids(&store), vec!["1", "2"]);
        assert_eq!(store.get("1").unwrap().title, "A");
        assert_eq!(store.status(), LoadStatus::Succeeded);
    }

    #[test]
    fn test_batch_dedupes_within_itself() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("7", "First"), Record::new("7", "Second")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("7").unwrap().title, "First");
    }

    #[test]
    fn test_batch_does_not_clobber_likes() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "A")]);
        store.toggle_like("1");

        store.ingest_batch(vec![Record::new("1", "A")]);
        assert!(store.get("1").unwrap().liked);
    }

    #[test]
    fn test_search_results_keep_local_records_first() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Aviation"), Record::new("2", "Bramble")]);
        let local = store.create(RecordDraft::new("House Sour", "Lemon, sugar, rye").with_id("local-1"));

        store.ingest_search_results(vec![
            Record::new("3", "Margarita"),
            Record::new(local.clone(), "Remote impostor"),
        ]);

        assert_eq!(ids(&store), vec!["local-1", "3"]);
        assert_eq!(store.get(&local).unwrap().title, "House Sour");
    }

    #[test]
    fn test_search_results_drop_unliked_and_liked_remote() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Aviation")]);
        store.toggle_like("1");

        store.ingest_search_results(vec![Record::new("2", "Bramble")]);
        assert_eq!(ids(&store), vec!["2"]);
    }

    #[test]
    fn test_ingest_single_absent_is_noop() {
        let mut store = CatalogStore::default();
        store.ingest_single(None);
        assert!(store.is_empty());
        assert_eq!(store.status(), LoadStatus::Idle);
    }

    #[test]
    fn test_ingest_single_does_not_overwrite() {
        let mut store = CatalogStore::default();
        store.ingest_single(Some(Record::new("9", "Old Fashioned")));
        store.ingest_single(Some(Record::new("9", "Changed")));
        assert_eq!(store.get("9").unwrap().title, "Old Fashioned");
    }

    #[test]
    fn test_create_goes_first_with_local_flags() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "A")]);

        let id = store.create(RecordDraft::new("Mojito", "Mint and rum"));

        let first = &store.records()[0];
        assert_eq!(first.id, id);
        assert!(first.created);
        assert!(!first.liked);
        assert!(!first.deleted);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut store = CatalogStore::default();
        let a = store.create(RecordDraft::new("One", "first"));
        let b = store.create(RecordDraft::new("Two", "second"));
        let c = store.create(RecordDraft::new("Three", "third"));

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_create_with_taken_id_replaces() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Remote"), Record::new("2", "Other")]);
        store.create(RecordDraft::new("Local", "takes over").with_id("2"));

        assert_eq!(ids(&store), vec!["2", "1"]);
        assert!(store.get("2").unwrap().created);
    }

    #[test]
    fn test_update_merges_and_ignores_unknown() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Daiquiri").with_category("Cocktail")]);

        assert!(store.update("1", RecordChanges::new().description("Rum, lime, sugar")));
        assert!(!store.update("404", RecordChanges::new().title("nope")));

        let record = store.get("1").unwrap();
        assert_eq!(record.title, "Daiquiri");
        assert_eq!(record.description, "Rum, lime, sugar");
        assert_eq!(record.category.as_deref(), Some("Cocktail"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_like_is_involution() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "A")]);

        assert_eq!(store.toggle_like("1"), Some(true));
        assert_eq!(store.toggle_like("1"), Some(false));
        assert_eq!(store.toggle_like("missing"), None);
    }

    #[test]
    fn test_remove_then_ingest_if_missing_readds() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "A")]);

        assert!(store.remove("1").is_some());
        assert!(store.remove("1").is_none());

        store.ingest_if_missing(Record::new("1", "A"));
        assert!(store.contains("1"));
    }

    #[test]
    fn test_edit_commit_writes_back() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Negroni"), Record::new("2", "Boulevardier")]);

        assert!(store.start_edit("1"));
        assert_eq!(store.editing().unwrap().title, "Negroni");

        let id = store.commit_edit(RecordChanges::new().title("Negroni Sbagliato"));
        assert_eq!(id.as_deref(), Some("1"));
        assert!(store.editing().is_none());
        assert_eq!(store.get("1").unwrap().title, "Negroni Sbagliato");
        assert_eq!(ids(&store), vec!["1", "2"]);
    }

    #[test]
    fn test_edit_cancel_leaves_collection() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Negroni")]);

        store.start_edit("1");
        store.cancel_edit();
        assert!(store.editing().is_none());
        assert_eq!(store.commit_edit(RecordChanges::new().title("x")), None);
        assert_eq!(store.get("1").unwrap().title, "Negroni");
    }

    #[test]
    fn test_edit_start_unknown_keeps_buffer() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Negroni")]);
        store.start_edit("1");

        assert!(!store.start_edit("nope"));
        assert_eq!(store.editing().unwrap().id, "1");
    }

    #[test]
    fn test_edit_commit_after_remove_writes_nothing() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Negroni")]);
        store.start_edit("1");
        store.remove("1");

        assert_eq!(store.commit_edit(RecordChanges::new().title("Ghost")), None);
        assert!(store.is_empty());
        assert!(store.editing().is_none());
    }

    #[test]
    fn test_edit_snapshot_is_decoupled_from_live_record() {
        let mut store = CatalogStore::default();
        store.ingest_batch(vec![Record::new("1", "Negroni")]);
        store.start_edit("1");
        store.toggle_like("1");

        // The snapshot predates the like, so committing restores liked = false
        store.commit_edit(RecordChanges::new());
        assert!(!store.get("1").unwrap().liked);
    }

    #[test]
    fn test_setters_reset_page() {
        let mut store = CatalogStore::default();

        store.set_page(4);
        store.set_filter(Filter::Favorites);
        assert_eq!(store.page(), 1);

        store.set_page(3);
        store.set_search("lime");
        assert_eq!(store.page(), 1);

        store.set_page(2);
        store.set_page_size(24);
        assert_eq!(store.page(), 1);
        assert_eq!(store.page_size(), 24);

        store.set_page(0);
        assert_eq!(store.page(), 1);
        store.set_page_size(0);
        assert_eq!(store.page_size(), 1);
    }

    #[test]
    fn test_stale_page_is_clamped_on_render() {
        let mut store = CatalogStore::new(2);
        store.ingest_batch((0..5).map(|i| Record::new(i.to_string(), "x")).collect());
        store.set_page(3);
        store.remove("4");

        let view = store.view();
        assert_eq!(store.page(), 3);
        assert_eq!(view.slice.page, 2);
        assert_eq!(view.slice.items.len(), 2);
    }

    #[test]
    fn test_fetch_failure_then_recovery() {
        let mut store = CatalogStore::default();
        store.begin_fetch();
        assert_eq!(store.status(), LoadStatus::Loading);

        store.fail_fetch("HTTP 503");
        assert_eq!(store.status(), LoadStatus::Failed);
        assert_eq!(store.error(), Some("HTTP 503"));

        store.begin_fetch();
        assert_eq!(store.error(), None);
        store.ingest_batch(vec![Record::new("1", "A")]);
        assert_eq!(store.status(), LoadStatus::Succeeded);
    }

    #[test]
    fn test_stale_search_is_dropped() {
        let mut store = CatalogStore::default();
        let slow = store.begin_search();
        let fast = store.begin_search();

        assert!(store.complete_search::<String>(fast, Ok(vec![Record::new("2", "Margarita")])));
        assert!(!store.complete_search::<String>(slow, Ok(vec![Record::new("1", "Mai Tai")])));

        assert_eq!(ids(&store), vec!["2"]);
        assert_eq!(store.status(), LoadStatus::Succeeded);
    }

    #[test]
    fn test_stale_search_failure_is_dropped() {
        let mut store = CatalogStore::default();
        let slow = store.begin_search();
        store.cancel_searches();

        assert!(!store.complete_search(slow, Err::<Vec<Record>, _>("timeout")));
        assert_eq!(store.error(), None);
    }
}
