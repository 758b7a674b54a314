use serde::{Deserialize, Serialize};

/// Page sizes for child fetches.
///
/// The top-level listing pages in larger chunks than nested folders: the
/// root is where users scroll, nested folders usually hold fewer items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Page size for the view root's listing.
    pub root_page_size: usize,
    /// Page size for nested folders.
    pub page_size: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            root_page_size: 100,
            page_size: 50,
        }
    }
}
