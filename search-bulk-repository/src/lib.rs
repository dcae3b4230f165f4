//! # Search Bulk Repository
//!
//! This crate combines many independent index mutations into a single
//! `_bulk` call, submits it, and reconciles the per-item response with the
//! submitted works. Partial failures are collected into one
//! [`BulkRequestFailedError`] after every item has been classified.
//!
//! It includes definitions for errors, the collaborator interfaces, a
//! default execution context, concrete bulkable works, and an OpenSearch
//! transport.

pub mod bulk;
pub mod config;
pub mod context;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod request;
pub mod works;

pub use bulk::{BulkWork, BulkWorkBuilder};
pub use config::TransportConfig;
pub use context::{CountingIndexingMonitor, DefaultWorkExecutionContext, NoIndexDirtyContext};
pub use errors::{BulkRequestFailedError, ClientError, SearchError, SucceededWork, WorkError};
pub use interfaces::{BulkableWork, IndexingMonitor, SearchTransport, WorkExecutionContext};
pub use opensearch::OpenSearchTransport;
pub use request::{RawResponse, SearchRequest};
pub use works::{BulkAction, SimpleBulkableWork, VersionType, WorkTarget};
