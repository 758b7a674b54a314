use super::store::ChildStore;
use crate::fetch::source::{Item, ItemKind, ParentId};
use std::collections::{HashMap, HashSet};

/// Tri-state classification of an item (or of the whole set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    /// Some, but not all, of a folder's loaded descendants are selected.
    Mixed,
    Selected,
}

/// What a tri-state query is about.
#[derive(Debug, Clone, Copy)]
pub enum SelectionTarget<'a> {
    /// The whole set (the header "select everything" checkbox).
    All,
    Item(&'a Item),
}

/// Explicit selection state: one uid set per item kind plus the global
/// "everything" flag.
///
/// Folder selection is never stored as a derived fact ("this folder's
/// descendants are selected"): descendants may not be loaded yet, so a
/// stored answer would go stale as pages arrive. Mixed/full classification
/// is always computed live against the child store.
#[derive(Debug, Default)]
pub struct Selection {
    all: bool,
    by_kind: HashMap<ItemKind, HashSet<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit selection bit for one item. Never touches the
    /// `all` flag.
    pub fn set_item(&mut self, kind: ItemKind, uid: &str, selected: bool) {
        let entries = self.by_kind.entry(kind).or_default();
        if selected {
            entries.insert(uid.to_string());
        } else {
            entries.remove(uid);
        }
    }

    /// Set the global "everything is selected" flag.
    ///
    /// Clearing it also clears every explicit per-item entry, so "deselect
    /// all" is a true reset rather than a leftover mixed state. Setting it
    /// does not populate per-item entries; the flag alone is the source of
    /// truth and is checked first by every query.
    pub fn set_all(&mut self, selected: bool) {
        self.all = selected;
        if !selected {
            self.by_kind.clear();
        }
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    fn is_explicit(&self, kind: ItemKind, uid: &str) -> bool {
        self.by_kind
            .get(&kind)
            .map(|entries| entries.contains(uid))
            .unwrap_or(false)
    }

    /// Any explicit per-item entry at all, of any kind.
    pub fn any_explicit(&self) -> bool {
        self.by_kind.values().any(|entries| !entries.is_empty())
    }

    pub fn clear(&mut self) {
        self.all = false;
        self.by_kind.clear();
    }

    /// Tri-state query, computed live against the store.
    ///
    /// Priority is Selected over Mixed over Unselected: an explicitly
    /// selected item reports Selected no matter what its descendants say.
    /// Unloaded descendants contribute nothing; they cannot push a folder to
    /// Mixed until their pages arrive. That approximation is deliberate.
    pub fn state(&self, target: SelectionTarget<'_>, store: &ChildStore) -> SelectionState {
        match target {
            SelectionTarget::All => {
                if self.all {
                    SelectionState::Selected
                } else if self.any_explicit() {
                    SelectionState::Mixed
                } else {
                    SelectionState::Unselected
                }
            }
            SelectionTarget::Item(item) => {
                if self.all || self.is_explicit(item.kind, &item.uid) {
                    return SelectionState::Selected;
                }
                if item.is_folder() && self.has_selected_descendants(&item.uid, store) {
                    return SelectionState::Mixed;
                }
                SelectionState::Unselected
            }
        }
    }

    /// Whether any loaded descendant of `folder_uid`, at any depth, is
    /// explicitly selected.
    ///
    /// Explicit work-stack traversal over the store's parent-to-children
    /// index rather than recursion, so deep hierarchies cannot exhaust the
    /// call stack.
    fn has_selected_descendants(&self, folder_uid: &str, store: &ChildStore) -> bool {
        let mut stack = vec![ParentId::folder(folder_uid)];

        while let Some(parent) = stack.pop() {
            for item in store.collection(&parent).items() {
                if self.is_explicit(item.kind, &item.uid) {
                    return true;
                }
                if item.is_folder() {
                    stack.push(ParentId::Folder(item.uid.clone()));
                }
            }
        }

        false
    }
}
