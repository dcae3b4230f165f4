//! Search transport trait definition.

use async_trait::async_trait;

use crate::errors::ClientError;
use crate::request::{RawResponse, SearchRequest};

/// Sends pre-built requests to the search engine.
///
/// Implementations own connection management, timeouts and cancellation.
/// A response is returned for every HTTP status; interpreting the status is
/// left to the caller.
///
/// # Error Handling
///
/// Return [`ClientError::Search`] for failures that are already
/// self-explanatory and [`ClientError::Transport`] for low-level failures that
/// should be reported together with the request.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Send a request and return the raw response.
    async fn execute(&self, request: &SearchRequest) -> Result<RawResponse, ClientError>;
}
