use std::collections::HashSet;

/// Set of folder uids that are currently expanded.
///
/// Pure bookkeeping: toggling a folder here has no loading side effects.
/// Fetching on open is driven by the facade so the two concerns stay
/// independently testable. A folder's open state is independent of whether
/// its children were ever fetched; absent entries read as closed.
#[derive(Debug, Default)]
pub struct OpenFolders {
    open: HashSet<String>,
}

impl OpenFolders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&mut self, folder_uid: &str, is_open: bool) {
        if is_open {
            self.open.insert(folder_uid.to_string());
        } else {
            self.open.remove(folder_uid);
        }
    }

    pub fn is_open(&self, folder_uid: &str) -> bool {
        self.open.contains(folder_uid)
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }
}
