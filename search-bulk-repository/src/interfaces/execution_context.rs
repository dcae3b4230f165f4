//! Execution context trait definitions.

use super::SearchTransport;

/// Receives notifications about documents written to the index.
pub trait IndexingMonitor: Send + Sync {
    /// Called once documents have been added to the index.
    fn documents_added(&self, count: u64);
}

/// The ambient capabilities available to a work while it executes.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a single context can serve
/// bulk requests running concurrently on different tasks.
pub trait WorkExecutionContext: Send + Sync {
    /// The transport used to reach the search engine.
    fn client(&self) -> &dyn SearchTransport;

    /// Record that the given index has pending writes and needs a refresh.
    fn set_index_dirty(&self, index_name: &str);

    /// The monitor notified of indexed documents.
    fn indexing_monitor(&self) -> &dyn IndexingMonitor;
}
