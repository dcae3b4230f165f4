//! Errors raised by the transport and parsing collaborators.

use thiserror::Error;

use super::SearchError;

/// A boxed error that can cross task boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by a [`SearchTransport`](crate::interfaces::SearchTransport)
/// or by response parsing.
///
/// The two variants are handled differently by the bulk executor: a
/// [`ClientError::Search`] is already self-explanatory and is returned
/// unchanged, while a [`ClientError::Transport`] gets wrapped with the
/// request and response that were involved.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A domain error that needs no further context.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A low-level failure (I/O, HTTP, malformed body).
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),
}

impl ClientError {
    /// Create a transport error from any error or message.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}
