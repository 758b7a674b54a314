use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node in the browsed hierarchy.
///
/// Items are immutable once received from a source: the browsing layer never
/// edits them in place, it only replaces a parent's page set wholesale on
/// refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique within its kind.
    pub uid: String,
    pub kind: ItemKind,
    pub title: String,
    /// Absent for items in the top-level listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<String>,
}

impl Item {
    pub fn folder(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: ItemKind::Folder,
            title: title.into(),
            parent_uid: None,
        }
    }

    pub fn dashboard(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: ItemKind::Dashboard,
            title: title.into(),
            parent_uid: None,
        }
    }

    pub fn with_parent(mut self, parent_uid: impl Into<String>) -> Self {
        self.parent_uid = Some(parent_uid.into());
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }
}

/// Kind of a real (fetched) item.
///
/// Synthetic rows such as pagination placeholders are not items and have no
/// kind here; see `tree::flatten::RowItem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    Dashboard,
}

/// Identifies whose children a collection holds.
///
/// `Root` is the sentinel for the top-level listing, which is paginated with
/// the same machinery as any folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentId {
    Root,
    Folder(String),
}

impl ParentId {
    pub fn folder(uid: impl Into<String>) -> Self {
        ParentId::Folder(uid.into())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ParentId::Root)
    }

    /// The folder uid, if this is a folder parent.
    pub fn folder_uid(&self) -> Option<&str> {
        match self {
            ParentId::Root => None,
            ParentId::Folder(uid) => Some(uid),
        }
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentId::Root => write!(f, "$root"),
            ParentId::Folder(uid) => write!(f, "{}", uid),
        }
    }
}

/// One page of children as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Item>,
    /// Opaque continuation token; `None` means no more pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }
}

/// Async source of paginated children.
///
/// This trait abstracts the remote listing service so the browsing engine can
/// run against HTTP APIs, test fixtures, or anything else that can page
/// through a parent's children. Retry, auth, and transport concerns live
/// behind the implementation.
#[async_trait]
pub trait ChildSource: Send + Sync {
    /// Fetch one page of children for `parent`.
    ///
    /// `cursor` is the continuation token from the previous page, or `None`
    /// for the first page. Implementations should return at most `page_size`
    /// items.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or remote failure. The engine records
    /// the failure against the parent and does not retry automatically.
    async fn fetch_children_page(
        &self,
        parent: &ParentId,
        page_size: usize,
        cursor: Option<&str>,
    ) -> anyhow::Result<Page>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builders() {
        let folder = Item::folder("f1", "General");
        assert_eq!(folder.uid, "f1");
        assert!(folder.is_folder());
        assert!(folder.parent_uid.is_none());

        let dash = Item::dashboard("d1", "Overview").with_parent("f1");
        assert_eq!(dash.kind, ItemKind::Dashboard);
        assert_eq!(dash.parent_uid.as_deref(), Some("f1"));
    }

    #[test]
    fn test_parent_id() {
        assert!(ParentId::Root.is_root());
        assert_eq!(ParentId::Root.folder_uid(), None);

        let parent = ParentId::folder("f1");
        assert!(!parent.is_root());
        assert_eq!(parent.folder_uid(), Some("f1"));
        assert_eq!(parent.to_string(), "f1");
        assert_eq!(ParentId::Root.to_string(), "$root");
    }

    #[test]
    fn test_page_deserializes_from_wire_shape() {
        let page: Page = serde_json::from_str(
            r#"{
                "items": [
                    {"uid": "f1", "kind": "folder", "title": "General"},
                    {"uid": "d1", "kind": "dashboard", "title": "Overview", "parent_uid": "f1"}
                ],
                "next_cursor": "50"
            }"#,
        )
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].kind, ItemKind::Folder);
        assert_eq!(page.items[1].parent_uid.as_deref(), Some("f1"));
        assert_eq!(page.next_cursor.as_deref(), Some("50"));
    }

    #[test]
    fn test_page_without_cursor_means_last_page() {
        let page: Page = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.next_cursor.is_none());
    }
}
