//! Dependency initialization and wiring for the bulk submitter.

use std::env;
use std::sync::Arc;
use tracing::info;

use crate::IndexingError;
use search_bulk_repository::{DefaultWorkExecutionContext, OpenSearchTransport, TransportConfig};

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSettings {
    /// How to reach the search engine.
    pub transport: TransportConfig,
    /// Whether bulk requests refresh the touched indexes.
    pub refresh: bool,
}

impl BulkSettings {
    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Request timeout in seconds (default: none)
    /// - `BULK_REFRESH`: `true`/`false`/`1`/`0` (default: false)
    pub fn from_env() -> Result<Self, IndexingError> {
        let refresh = match env::var("BULK_REFRESH") {
            Ok(value) => parse_flag(&value)
                .ok_or_else(|| IndexingError::config(format!("Invalid BULK_REFRESH value: {}", value)))?,
            Err(_) => false,
        };

        Ok(Self {
            transport: TransportConfig::from_env(),
            refresh,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The execution context bulk requests run in.
    pub context: DefaultWorkExecutionContext,
    /// Whether bulk requests refresh the touched indexes.
    pub refresh: bool,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub fn new(settings: BulkSettings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.transport.url,
            refresh = settings.refresh,
            "Initializing dependencies"
        );

        let transport = OpenSearchTransport::new(&settings.transport).map_err(|e| {
            IndexingError::config(format!("Failed to create OpenSearch transport: {}", e))
        })?;

        let context = DefaultWorkExecutionContext::new(Arc::new(transport));

        Ok(Self {
            context,
            refresh: settings.refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_dependencies_reject_invalid_url() {
        let settings = BulkSettings {
            transport: TransportConfig::new("not a url"),
            refresh: false,
        };

        let result = Dependencies::new(settings);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_dependencies_keep_refresh_setting() {
        let settings = BulkSettings {
            transport: TransportConfig::default(),
            refresh: true,
        };

        let dependencies = Dependencies::new(settings).unwrap();
        assert!(dependencies.refresh);
        assert!(dependencies.context.dirty_indexes().is_empty());
    }
}
