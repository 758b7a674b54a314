use super::open_state::OpenFolders;
use super::store::ChildStore;
use crate::fetch::source::{Item, ParentId};

/// Kind of a synthetic row produced by the flattener.
///
/// These are not items: they never come from a source, are never expandable,
/// and are never selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRowKind {
    /// More children exist (or may exist) for the parent; the rendering
    /// surface requests a load-more when this row scrolls into view.
    PaginationPlaceholder,
    /// The parent folder is fully loaded and has no children.
    EmptyFolder,
}

/// One entry in the flattened row sequence: a real item or a synthetic row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowItem {
    Item(Item),
    Ui { kind: UiRowKind, parent: ParentId },
}

impl RowItem {
    /// Stable identity for the rendering surface. Collections are
    /// append-only, so keys never move between re-renders.
    pub fn row_key(&self) -> String {
        match self {
            RowItem::Item(item) => format!("{:?}:{}", item.kind, item.uid),
            RowItem::Ui { kind: UiRowKind::PaginationPlaceholder, parent } => {
                format!("{}-pagination", parent)
            }
            RowItem::Ui { kind: UiRowKind::EmptyFolder, parent } => {
                format!("{}-empty", parent)
            }
        }
    }
}

/// A visible row: what to render and how deep to indent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub item: RowItem,
    pub depth: usize,
}

impl FlatRow {
    /// False only for pagination placeholders; the windowed renderer uses
    /// this to decide when to request more data.
    pub fn is_loaded(&self) -> bool {
        !matches!(
            self.item,
            RowItem::Ui {
                kind: UiRowKind::PaginationPlaceholder,
                ..
            }
        )
    }
}

/// Produce the ordered row sequence for the tree rooted at `root`.
///
/// Depth-first, pre-order: each loaded item is emitted in document order;
/// open folders recurse into their loaded children one level deeper. After
/// an open folder's (or the root's) loaded children, one pagination
/// placeholder is emitted if the collection still has more pages, and one
/// empty-folder row if the folder is fully loaded with no children.
///
/// The output is recomputed from scratch on every call; cost is linear in
/// the currently loaded, currently visible rows, so there is no incremental
/// patching to keep consistent.
pub fn flatten(root: &ParentId, store: &ChildStore, open: &OpenFolders) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    emit_children(root, 0, store, open, &mut rows);
    rows
}

fn emit_children(
    parent: &ParentId,
    depth: usize,
    store: &ChildStore,
    open: &OpenFolders,
    rows: &mut Vec<FlatRow>,
) {
    let collection = store.collection(parent);

    for item in collection.items() {
        rows.push(FlatRow {
            item: RowItem::Item(item.clone()),
            depth,
        });

        if item.is_folder() && open.is_open(&item.uid) {
            emit_children(
                &ParentId::Folder(item.uid.clone()),
                depth + 1,
                store,
                open,
                rows,
            );
        }
    }

    if collection.should_show_placeholder() {
        rows.push(FlatRow {
            item: RowItem::Ui {
                kind: UiRowKind::PaginationPlaceholder,
                parent: parent.clone(),
            },
            depth,
        });
    } else if depth > 0 && collection.fully_loaded() && collection.items().is_empty() {
        // Only for folders opened within the view; an empty view root is
        // the hosting shell's empty-state, not a row.
        rows.push(FlatRow {
            item: RowItem::Ui {
                kind: UiRowKind::EmptyFolder,
                parent: parent.clone(),
            },
            depth,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::source::Item;
    use crate::tree::store::LoadStatus;
    use proptest::prelude::*;

    fn store_with_root(items: Vec<Item>, cursor: Option<&str>) -> ChildStore {
        let mut store = ChildStore::new();
        store.append_page(&ParentId::Root, items, cursor.map(String::from));
        store
    }

    fn uids(rows: &[FlatRow]) -> Vec<String> {
        rows.iter().map(|r| r.item.row_key()).collect()
    }

    #[test]
    fn test_closed_folders_hide_children() {
        let mut store = store_with_root(
            vec![Item::folder("f1", "F1"), Item::dashboard("d0", "D0")],
            None,
        );
        store.append_page(
            &ParentId::folder("f1"),
            vec![Item::dashboard("d1", "D1").with_parent("f1")],
            None,
        );
        let open = OpenFolders::new();

        let rows = flatten(&ParentId::Root, &store, &open);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].depth, 0);
    }

    #[test]
    fn test_open_folder_emits_children_one_level_deeper() {
        let mut store = store_with_root(vec![Item::folder("f1", "F1")], None);
        store.append_page(
            &ParentId::folder("f1"),
            vec![
                Item::dashboard("d1", "D1").with_parent("f1"),
                Item::dashboard("d2", "D2").with_parent("f1"),
            ],
            None,
        );
        let mut open = OpenFolders::new();
        open.set_open("f1", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].depth, 1);
        assert!(rows.iter().all(|r| r.is_loaded()));
    }

    #[test]
    fn test_placeholder_follows_partially_loaded_folder() {
        let mut store = store_with_root(vec![Item::folder("f1", "F1")], None);
        store.append_page(
            &ParentId::folder("f1"),
            vec![Item::dashboard("d1", "D1").with_parent("f1")],
            Some("1".into()),
        );
        let mut open = OpenFolders::new();
        open.set_open("f1", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        assert_eq!(
            uids(&rows),
            vec!["Folder:f1", "Dashboard:d1", "f1-pagination"]
        );
        assert_eq!(rows[2].depth, 1);
        assert!(!rows[2].is_loaded());
    }

    #[test]
    fn test_open_unfetched_folder_shows_placeholder() {
        let store = store_with_root(vec![Item::folder("f1", "F1")], None);
        let mut open = OpenFolders::new();
        open.set_open("f1", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        assert_eq!(uids(&rows), vec!["Folder:f1", "f1-pagination"]);
    }

    #[test]
    fn test_root_pagination_placeholder() {
        let store = store_with_root(vec![Item::dashboard("d1", "D1")], Some("1"));

        let rows = flatten(&ParentId::Root, &store, &OpenFolders::new());
        assert_eq!(uids(&rows), vec!["Dashboard:d1", "$root-pagination"]);
        assert_eq!(rows[1].depth, 0);
    }

    #[test]
    fn test_fully_loaded_empty_folder_row() {
        let mut store = store_with_root(vec![Item::folder("f1", "F1")], None);
        store.append_page(&ParentId::folder("f1"), vec![], None);
        let mut open = OpenFolders::new();
        open.set_open("f1", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        assert_eq!(uids(&rows), vec!["Folder:f1", "f1-empty"]);
        assert_eq!(rows[1].depth, 1);
        // Empty-folder rows are loaded rows, not load-more triggers.
        assert!(rows[1].is_loaded());
    }

    #[test]
    fn test_empty_root_emits_no_rows() {
        let store = store_with_root(vec![], None);
        let rows = flatten(&ParentId::Root, &store, &OpenFolders::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_errored_parent_emits_no_placeholder() {
        let mut store = store_with_root(vec![Item::folder("f1", "F1")], None);
        store.append_page(
            &ParentId::folder("f1"),
            vec![Item::dashboard("d1", "D1").with_parent("f1")],
            Some("1".into()),
        );
        store.set_status(&ParentId::folder("f1"), LoadStatus::Pending);
        store.set_status(&ParentId::folder("f1"), LoadStatus::Error);
        let mut open = OpenFolders::new();
        open.set_open("f1", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        // Loaded children stay visible; the subtree just stops growing.
        assert_eq!(uids(&rows), vec!["Folder:f1", "Dashboard:d1"]);
    }

    #[test]
    fn test_nested_depths() {
        let mut store = store_with_root(vec![Item::folder("f1", "F1")], None);
        store.append_page(
            &ParentId::folder("f1"),
            vec![Item::folder("f2", "F2").with_parent("f1")],
            None,
        );
        store.append_page(
            &ParentId::folder("f2"),
            vec![Item::dashboard("d1", "D1").with_parent("f2")],
            None,
        );
        let mut open = OpenFolders::new();
        open.set_open("f1", true);
        open.set_open("f2", true);

        let rows = flatten(&ParentId::Root, &store, &open);
        let depths: Vec<_> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_view_root_folder_emits_no_rows() {
        let mut store = ChildStore::new();
        store.append_page(&ParentId::folder("f1"), vec![], None);

        let rows = flatten(&ParentId::folder("f1"), &store, &OpenFolders::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_view_rooted_at_folder() {
        let mut store = ChildStore::new();
        store.append_page(
            &ParentId::folder("f1"),
            vec![Item::dashboard("d1", "D1").with_parent("f1")],
            None,
        );

        let rows = flatten(&ParentId::folder("f1"), &store, &OpenFolders::new());
        assert_eq!(uids(&rows), vec!["Dashboard:d1"]);
        assert_eq!(rows[0].depth, 0);
    }

    proptest! {
        #[test]
        fn prop_flatten_is_deterministic(
            folder_count in 0usize..6,
            dash_count in 0usize..6,
            open_mask in 0u8..64,
        ) {
            let mut root_items = Vec::new();
            let mut store = ChildStore::new();
            let mut open = OpenFolders::new();

            for i in 0..folder_count {
                let uid = format!("f{i}");
                root_items.push(Item::folder(uid.clone(), uid.clone()));
                store.append_page(
                    &ParentId::Folder(uid.clone()),
                    vec![Item::dashboard(format!("d-in-{uid}"), "D").with_parent(uid.clone())],
                    if i % 2 == 0 { Some("next".into()) } else { None },
                );
                if open_mask & (1 << i) != 0 {
                    open.set_open(&uid, true);
                }
            }
            for i in 0..dash_count {
                root_items.push(Item::dashboard(format!("d{i}"), "D"));
            }
            store.append_page(&ParentId::Root, root_items, None);

            let first = flatten(&ParentId::Root, &store, &open);
            let second = flatten(&ParentId::Root, &store, &open);
            prop_assert_eq!(first, second);
        }
    }
}
