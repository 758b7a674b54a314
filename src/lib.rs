// Browsing engine for lazily-paginated folder/item hierarchies.
//
// Children are fetched incrementally from a `ChildSource` as folders open
// and placeholder rows scroll into view; the engine keeps the flattened row
// sequence and the tri-state selection model consistent with whatever subset
// of the hierarchy is currently loaded.

pub mod config;
pub mod fetch;
pub mod tree;

pub use config::BrowseConfig;
pub use fetch::{ChildSource, InMemorySource, Item, ItemKind, Page, ParentId};
pub use tree::{
    FlatRow, LoadStatus, RowItem, SelectionState, SelectionTarget, TreeBrowser, UiRowKind,
};
