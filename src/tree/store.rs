use crate::fetch::source::{Item, ItemKind, ParentId};
use std::collections::HashMap;

/// Load status of one parent's child collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No fetch has ever been issued for this parent.
    NotStarted,
    /// A fetch is in flight.
    Pending,
    /// The last fetch completed successfully.
    Fulfilled,
    /// The last fetch failed. Previously loaded pages are kept.
    Error,
}

/// Ordered, append-only collection of one parent's loaded children.
///
/// Items arrive in page order and are never reordered, so row identity is
/// stable across re-renders. Duplicates (same kind and uid) are dropped on
/// append, which makes retrying an already-applied page a no-op.
#[derive(Debug, Clone)]
pub struct ChildCollection {
    items: Vec<Item>,
    cursor: Option<String>,
    status: LoadStatus,
}

static EMPTY: ChildCollection = ChildCollection {
    items: Vec::new(),
    cursor: None,
    status: LoadStatus::NotStarted,
};

impl ChildCollection {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            status: LoadStatus::NotStarted,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Continuation token from the last fulfilled fetch.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Every child of this parent has been loaded.
    pub fn fully_loaded(&self) -> bool {
        self.status == LoadStatus::Fulfilled && self.cursor.is_none()
    }

    /// Whether the flattener should emit a pagination placeholder after this
    /// collection's rows. Errored parents stop advertising more data until a
    /// fresh load-more is issued.
    pub fn should_show_placeholder(&self) -> bool {
        match self.status {
            LoadStatus::Error => false,
            _ => !self.fully_loaded(),
        }
    }

    fn contains(&self, kind: ItemKind, uid: &str) -> bool {
        self.items.iter().any(|i| i.kind == kind && i.uid == uid)
    }
}

/// Per-parent paged child collections, keyed by `ParentId`.
///
/// Owns no fetching or business logic, only storage and page-append. Absence
/// of a parent is a valid state (nothing fetched yet), not an error.
#[derive(Debug, Default)]
pub struct ChildStore {
    collections: HashMap<ParentId, ChildCollection>,
}

impl ChildStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collection for a parent.
    ///
    /// Never fails; parents that were never fetched read as an empty
    /// `NotStarted` collection.
    pub fn collection(&self, parent: &ParentId) -> &ChildCollection {
        self.collections.get(parent).unwrap_or(&EMPTY)
    }

    pub fn status(&self, parent: &ParentId) -> LoadStatus {
        self.collection(parent).status
    }

    /// Append a fulfilled page to a parent's collection.
    ///
    /// Items already present (same kind and uid) are skipped, the cursor is
    /// replaced with `next_cursor`, and the status becomes `Fulfilled`.
    pub fn append_page(&mut self, parent: &ParentId, items: Vec<Item>, next_cursor: Option<String>) {
        let collection = self
            .collections
            .entry(parent.clone())
            .or_insert_with(ChildCollection::new);

        for item in items {
            if collection.contains(item.kind, &item.uid) {
                tracing::trace!(parent = %parent, uid = %item.uid, "skipping duplicate child");
                continue;
            }
            collection.items.push(item);
        }

        collection.cursor = next_cursor;
        collection.status = LoadStatus::Fulfilled;
    }

    /// Transition a parent's load status.
    ///
    /// Legal transitions: anything except `Pending` may become `Pending`
    /// (first fetch, next page, or retry after error), and `Pending` may
    /// become `Fulfilled` or `Error`. Anything else is ignored with a
    /// warning, never a panic.
    pub fn set_status(&mut self, parent: &ParentId, status: LoadStatus) {
        let collection = self
            .collections
            .entry(parent.clone())
            .or_insert_with(ChildCollection::new);

        let legal = match (collection.status, status) {
            (from, LoadStatus::Pending) => from != LoadStatus::Pending,
            (LoadStatus::Pending, LoadStatus::Fulfilled | LoadStatus::Error) => true,
            _ => false,
        };

        if legal {
            collection.status = status;
        } else {
            tracing::warn!(
                parent = %parent,
                from = ?collection.status,
                to = ?status,
                "ignoring illegal load status transition"
            );
        }
    }

    /// Drop a parent's collection entirely (used when refreshing).
    pub fn remove(&mut self, parent: &ParentId) {
        self.collections.remove(parent);
    }

    /// Drop every collection (session reset).
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Number of parents with a collection.
    pub fn parent_count(&self) -> usize {
        self.collections.len()
    }
}
