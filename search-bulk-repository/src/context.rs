//! Execution context implementations.
//!
//! [`DefaultWorkExecutionContext`] tracks the indexes that need a refresh.
//! [`NoIndexDirtyContext`] wraps any context and drops dirty-index signals,
//! which is what a bulk request that refreshes on its own needs.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::interfaces::{IndexingMonitor, SearchTransport, WorkExecutionContext};

/// Indexing monitor that counts added documents.
#[derive(Debug, Default)]
pub struct CountingIndexingMonitor {
    added: AtomicU64,
}

impl CountingIndexingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents added so far.
    pub fn documents_added_count(&self) -> u64 {
        self.added.load(Ordering::Relaxed)
    }
}

impl IndexingMonitor for CountingIndexingMonitor {
    fn documents_added(&self, count: u64) {
        self.added.fetch_add(count, Ordering::Relaxed);
    }
}

/// Context backed by a transport, recording dirty indexes in memory.
///
/// Whoever triggers refreshes outside of bulk requests drains the dirty set
/// with [`take_dirty_indexes`](Self::take_dirty_indexes).
pub struct DefaultWorkExecutionContext {
    client: Arc<dyn SearchTransport>,
    monitor: Arc<dyn IndexingMonitor>,
    dirty_indexes: Mutex<BTreeSet<String>>,
}

impl DefaultWorkExecutionContext {
    /// Create a context with a [`CountingIndexingMonitor`].
    pub fn new(client: Arc<dyn SearchTransport>) -> Self {
        Self::with_monitor(client, Arc::new(CountingIndexingMonitor::new()))
    }

    /// Create a context reporting to the given monitor.
    pub fn with_monitor(client: Arc<dyn SearchTransport>, monitor: Arc<dyn IndexingMonitor>) -> Self {
        Self {
            client,
            monitor,
            dirty_indexes: Mutex::new(BTreeSet::new()),
        }
    }

    /// Indexes currently marked as needing a refresh, sorted by name.
    pub fn dirty_indexes(&self) -> Vec<String> {
        self.dirty_indexes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Remove and return every index marked as needing a refresh.
    pub fn take_dirty_indexes(&self) -> BTreeSet<String> {
        std::mem::take(&mut *self.dirty_indexes.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl WorkExecutionContext for DefaultWorkExecutionContext {
    fn client(&self) -> &dyn SearchTransport {
        self.client.as_ref()
    }

    fn set_index_dirty(&self, index_name: &str) {
        let mut dirty = self
            .dirty_indexes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if dirty.insert(index_name.to_string()) {
            trace!(index = %index_name, "Index marked dirty");
        }
    }

    fn indexing_monitor(&self) -> &dyn IndexingMonitor {
        self.monitor.as_ref()
    }
}

/// Forwards every capability to a delegate, except that marking an index
/// dirty does nothing.
///
/// Used while a bulk request with `refresh=true` handles its results: the
/// engine refreshes every index the request touched, so a later refresh
/// would be redundant.
pub struct NoIndexDirtyContext<'a> {
    delegate: &'a dyn WorkExecutionContext,
}

impl<'a> NoIndexDirtyContext<'a> {
    pub fn new(delegate: &'a dyn WorkExecutionContext) -> Self {
        Self { delegate }
    }
}

impl WorkExecutionContext for NoIndexDirtyContext<'_> {
    fn client(&self) -> &dyn SearchTransport {
        self.delegate.client()
    }

    fn set_index_dirty(&self, _index_name: &str) {
        // Don't delegate
    }

    fn indexing_monitor(&self) -> &dyn IndexingMonitor {
        self.delegate.indexing_monitor()
    }
}
