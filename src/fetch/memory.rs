//! In-memory child source for tests and fixtures
//!
//! Serves pages out of a fixed item set with simple offset cursors. Supports
//! configurable per-call delay (to exercise in-flight deduplication) and
//! per-parent failure injection (to exercise the error path).

use super::source::{ChildSource, Item, Page, ParentId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// `ChildSource` backed by an in-memory hierarchy.
pub struct InMemorySource {
    children: HashMap<ParentId, Vec<Item>>,
    /// Behind a mutex so tests can flip failures mid-session through a
    /// shared handle.
    failing: Mutex<HashSet<ParentId>>,
    delay: Duration,
    fetch_count: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            failing: Mutex::new(HashSet::new()),
            delay: Duration::ZERO,
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Register the full child list for a parent, in document order.
    pub fn with_children(mut self, parent: ParentId, items: Vec<Item>) -> Self {
        self.children.insert(parent, items);
        self
    }

    /// Make every fetch for `parent` fail with a transport-style error.
    pub fn with_failure(self, parent: ParentId) -> Self {
        self.set_failing(&parent, true);
        self
    }

    /// Delay every fetch, simulating a slow remote.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of fetches issued so far, across all parents.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Start or stop failing fetches for `parent`.
    pub fn set_failing(&self, parent: &ParentId, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing {
            set.insert(parent.clone());
        } else {
            set.remove(parent);
        }
    }

    fn is_failing(&self, parent: &ParentId) -> bool {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(parent)
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChildSource for InMemorySource {
    async fn fetch_children_page(
        &self,
        parent: &ParentId,
        page_size: usize,
        cursor: Option<&str>,
    ) -> anyhow::Result<Page> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.is_failing(parent) {
            anyhow::bail!("listing service unavailable for {}", parent);
        }

        let all = self.children.get(parent).map(Vec::as_slice).unwrap_or(&[]);

        let offset: usize = match cursor {
            Some(c) => c
                .parse()
                .map_err(|_| anyhow::anyhow!("malformed cursor {:?}", c))?,
            None => 0,
        };

        // A cursor from a previous session may point past the end.
        let offset = offset.min(all.len());
        let end = (offset + page_size).min(all.len());
        let items = all[offset..end].to_vec();
        let next_cursor = if end < all.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }
}
