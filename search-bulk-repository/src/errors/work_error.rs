//! Errors raised by bulkable works.

use thiserror::Error;

/// Errors a bulkable work can raise while rendering itself or handling its result.
#[derive(Error, Debug)]
pub enum WorkError {
    /// The work does not name a usable index or document.
    #[error("Invalid work target: {0}")]
    InvalidTarget(String),

    /// The bulk response item for the work does not have the expected shape.
    #[error("Malformed bulk result item: {0}")]
    MalformedResultItem(String),

    /// The document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkError {
    /// Create an invalid target error.
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    /// Create a malformed result item error.
    pub fn malformed_result_item(msg: impl Into<String>) -> Self {
        Self::MalformedResultItem(msg.into())
    }
}
