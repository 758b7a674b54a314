// Tree browsing state: paged child collections, open-state, flattening,
// tri-state selection, and the facade that composes them.

pub mod flatten;
pub mod open_state;
pub mod selection;
pub mod store;
pub mod view;

pub use flatten::{flatten, FlatRow, RowItem, UiRowKind};
pub use open_state::OpenFolders;
pub use selection::{Selection, SelectionState, SelectionTarget};
pub use store::{ChildCollection, ChildStore, LoadStatus};
pub use view::TreeBrowser;
