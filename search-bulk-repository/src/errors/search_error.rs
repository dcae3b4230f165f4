//! Search error types.
//!
//! This module defines the errors a bulk execution can end with.

use thiserror::Error;

use super::{BoxError, BulkRequestFailedError};

/// Errors that can occur while executing requests against the search engine.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Failed to set up a connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or its response could not be read.
    ///
    /// Carries a rendition of the request and of whatever response was
    /// available when the failure happened.
    #[error("Search engine request failed: {source}\nRequest: {request}\nResponse: {response}")]
    RequestFailed {
        request: String,
        response: String,
        #[source]
        source: BoxError,
    },

    /// At least one work of a bulk request failed.
    #[error(transparent)]
    BulkRequestFailed(Box<BulkRequestFailedError>),

    /// The engine returned a different number of bulk items than works submitted.
    ///
    /// Results are correlated by position, so no item can be attributed safely.
    #[error(
        "Bulk response contains {actual} items for {expected} submitted works\nRequest: {request}\nResponse: {response}"
    )]
    BulkResponseItemCountMismatch {
        expected: usize,
        actual: usize,
        request: String,
        response: String,
    },
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request failure carrying the request and response context.
    pub fn request_failed(
        request: impl Into<String>,
        response: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::RequestFailed {
            request: request.into(),
            response: response.into(),
            source: source.into(),
        }
    }

    /// The aggregated report, if this is a partial bulk failure.
    pub fn as_bulk_failure(&self) -> Option<&BulkRequestFailedError> {
        match self {
            Self::BulkRequestFailed(report) => Some(report),
            _ => None,
        }
    }

    /// Consume the error and return the aggregated report, if any.
    pub fn into_bulk_failure(self) -> Option<Box<BulkRequestFailedError>> {
        match self {
            Self::BulkRequestFailed(report) => Some(report),
            _ => None,
        }
    }
}

impl From<BulkRequestFailedError> for SearchError {
    fn from(report: BulkRequestFailedError) -> Self {
        Self::BulkRequestFailed(Box::new(report))
    }
}
