//! Interface definitions for the bulk executor's collaborators.
//!
//! This module defines the abstract traits that allow the executor to work
//! with any transport, execution context, or kind of bulkable work.

mod bulkable_work;
mod execution_context;
mod search_transport;

pub use bulkable_work::BulkableWork;
pub use execution_context::{IndexingMonitor, WorkExecutionContext};
pub use search_transport::SearchTransport;
