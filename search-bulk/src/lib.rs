//! # Search Bulk
//!
//! Entry point library for submitting a batch of index mutations to the
//! search engine as one bulk request.
//!
//! This crate provides the configuration, dependency wiring and works-file
//! loading used by the `search-bulk` binary.

pub mod config;
pub mod works_file;

pub use config::{BulkSettings, Dependencies};

use thiserror::Error;

/// Errors that can occur while preparing or running a bulk submission.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] search_bulk_repository::SearchError),

    /// A work could not be built or rendered.
    #[error("Work error: {0}")]
    WorkError(#[from] search_bulk_repository::WorkError),

    /// The works file is not valid JSON.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
