// Fetch abstraction layer for paginated child listings
//
// This module defines the contract between the browsing engine and whatever
// actually lists children (a remote API, a fixture, ...), plus an in-memory
// implementation used by tests.

pub mod memory;
pub mod source;

pub use memory::InMemorySource;
pub use source::{ChildSource, Item, ItemKind, Page, ParentId};
