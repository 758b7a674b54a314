use super::flatten::{flatten, FlatRow};
use super::open_state::OpenFolders;
use super::selection::{Selection, SelectionState, SelectionTarget};
use super::store::{ChildStore, LoadStatus};
use crate::config::BrowseConfig;
use crate::fetch::source::{ChildSource, Item, ParentId};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session-scoped browsing state: the four shared containers behind one
/// lock. Single-writer-at-a-time; the lock is never held across an await.
#[derive(Debug)]
struct BrowseState {
    store: ChildStore,
    open: OpenFolders,
    selection: Selection,
    /// Parents with a fetch in flight. At most one per parent; doubles as
    /// the page-serialization latch (the next page for a parent cannot be
    /// requested until the previous one has been applied).
    in_flight: HashSet<ParentId>,
    /// Bumped on reset so completions of fetches started before the reset
    /// are discarded instead of repopulating torn-down state.
    generation: u64,
}

impl BrowseState {
    fn new() -> Self {
        Self {
            store: ChildStore::new(),
            open: OpenFolders::new(),
            selection: Selection::new(),
            in_flight: HashSet::new(),
            generation: 0,
        }
    }
}

/// Facade over the paged child store, open-state tracker, selection tracker,
/// and pagination latch: the single contract consumed by the rendering
/// surface.
///
/// All mutation goes through this type. Fetch errors are recorded against
/// the affected parent as `LoadStatus::Error` and are not returned to
/// callers; the subtree stops growing but stays interactive.
pub struct TreeBrowser {
    source: Arc<dyn ChildSource>,
    config: BrowseConfig,
    root: ParentId,
    state: Mutex<BrowseState>,
}

impl fmt::Debug for TreeBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBrowser")
            .field("source", &"<dyn ChildSource>")
            .field("config", &self.config)
            .field("root", &self.root)
            .finish()
    }
}

impl TreeBrowser {
    /// Create a browser over the top-level listing.
    pub fn new(source: Arc<dyn ChildSource>, config: BrowseConfig) -> Self {
        Self {
            source,
            config,
            root: ParentId::Root,
            state: Mutex::new(BrowseState::new()),
        }
    }

    /// Root the view at a folder instead of the top-level listing.
    pub fn rooted_at(mut self, folder_uid: impl Into<String>) -> Self {
        self.root = ParentId::Folder(folder_uid.into());
        self
    }

    pub fn root(&self) -> &ParentId {
        &self.root
    }

    fn state(&self) -> MutexGuard<'_, BrowseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The view root pages at the larger root size; nested folders page at
    /// the smaller nested size.
    fn page_size_for(&self, parent: &ParentId) -> usize {
        if *parent == self.root {
            self.config.root_page_size
        } else {
            self.config.page_size
        }
    }

    /// Fetch the first page of the view root. Call once when the view is
    /// mounted.
    pub async fn init(&self) {
        let root = self.root.clone();
        let page_size = self.page_size_for(&root);
        self.load_next_page(root, page_size).await;
    }

    /// Toggle a folder's expansion.
    ///
    /// Opening (a closed-to-open transition) immediately requests the
    /// folder's next page; closing touches only the open-state. The
    /// open-state itself is independent of load status, so reopening a
    /// fully loaded folder costs no fetch.
    pub async fn set_folder_open(&self, folder_uid: &str, is_open: bool) {
        let was_open = {
            let mut state = self.state();
            let was_open = state.open.is_open(folder_uid);
            state.open.set_open(folder_uid, is_open);
            was_open
        };

        if is_open && !was_open {
            let parent = ParentId::folder(folder_uid);
            let page_size = self.page_size_for(&parent);
            self.load_next_page(parent, page_size).await;
        }
    }

    /// Request the next page for `parent`, typically because its pagination
    /// placeholder row scrolled into view.
    pub async fn load_more(&self, parent: ParentId) {
        let page_size = self.page_size_for(&parent);
        self.load_next_page(parent, page_size).await;
    }

    /// Convenience for the rendering surface: load more of the view root.
    pub async fn request_load_more(&self) {
        self.load_more(self.root.clone()).await;
    }

    /// Drop a parent's loaded children and fetch its first page again.
    /// No-op while that parent already has a fetch in flight.
    pub async fn refresh(&self, parent: ParentId) {
        {
            let mut state = self.state();
            if state.in_flight.contains(&parent) {
                tracing::debug!(parent = %parent, "refresh skipped, fetch in flight");
                return;
            }
            state.store.remove(&parent);
        }
        let page_size = self.page_size_for(&parent);
        self.load_next_page(parent, page_size).await;
    }

    /// Issue at most one fetch for `parent`.
    ///
    /// A request while another is in flight for the same parent coalesces
    /// into it and returns immediately; the latch is released when the
    /// fetch completes, success or failure, so a retry is always possible.
    async fn load_next_page(&self, parent: ParentId, page_size: usize) {
        let (cursor, generation) = {
            let mut state = self.state();

            if state.in_flight.contains(&parent) {
                tracing::trace!(parent = %parent, "coalesced into in-flight fetch");
                return;
            }
            if state.store.collection(&parent).fully_loaded() {
                return;
            }

            state.in_flight.insert(parent.clone());
            state.store.set_status(&parent, LoadStatus::Pending);
            let cursor = state.store.collection(&parent).cursor().map(String::from);
            (cursor, state.generation)
        };

        let result = self
            .source
            .fetch_children_page(&parent, page_size, cursor.as_deref())
            .await;

        let mut state = self.state();

        if state.generation != generation {
            // This fetch predates a reset; its latch entry was already
            // cleared, and the current session may have its own fetch in
            // flight for this parent whose latch must stay held.
            tracing::trace!(parent = %parent, "discarding page fetched before reset");
            return;
        }
        state.in_flight.remove(&parent);

        match result {
            Ok(page) => {
                tracing::debug!(
                    parent = %parent,
                    count = page.items.len(),
                    has_more = page.next_cursor.is_some(),
                    "children page loaded"
                );
                state.store.append_page(&parent, page.items, page.next_cursor);
            }
            Err(error) => {
                tracing::warn!(parent = %parent, %error, "children page fetch failed");
                state.store.set_status(&parent, LoadStatus::Error);
            }
        }
    }

    /// The ordered visible rows, recomputed from current state.
    pub fn rows(&self) -> Vec<FlatRow> {
        let state = self.state();
        flatten(&self.root, &state.store, &state.open)
    }

    /// Whether the row at `index` is real loaded data (false for pagination
    /// placeholders and for out-of-range indexes).
    pub fn is_row_loaded(&self, index: usize) -> bool {
        self.rows().get(index).map(FlatRow::is_loaded).unwrap_or(false)
    }

    pub fn load_status(&self, parent: &ParentId) -> LoadStatus {
        self.state().store.status(parent)
    }

    pub fn is_folder_open(&self, folder_uid: &str) -> bool {
        self.state().open.is_open(folder_uid)
    }

    pub fn set_item_selected(&self, item: &Item, selected: bool) {
        self.state().selection.set_item(item.kind, &item.uid, selected);
    }

    pub fn set_all_selected(&self, selected: bool) {
        self.state().selection.set_all(selected);
    }

    pub fn selection_state(&self, target: SelectionTarget<'_>) -> SelectionState {
        let state = self.state();
        state.selection.state(target, &state.store)
    }

    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }

    /// Tear down the browsing session: drop all loaded pages, open-state,
    /// and selection. Fetches still in flight complete harmlessly; their
    /// results are discarded.
    pub fn reset(&self) {
        let mut state = self.state();
        state.generation = state.generation.wrapping_add(1);
        state.store.clear();
        state.open.clear();
        state.selection.clear();
        state.in_flight.clear();
    }
}
