//! Error types for the search bulk repository.

mod bulk_request_failed;
mod client_error;
mod search_error;
mod work_error;

pub use bulk_request_failed::{BulkRequestFailedError, SucceededWork};
pub use client_error::{BoxError, ClientError};
pub use search_error::SearchError;
pub use work_error::WorkError;
