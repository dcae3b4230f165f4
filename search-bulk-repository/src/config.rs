//! Configuration types for the search transport.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Configuration for the OpenSearch transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// The OpenSearch server URL (e.g., "http://localhost:9200").
    pub url: String,
    /// Timeout applied to every request. `None` uses the client default.
    pub request_timeout: Option<Duration>,
    /// Whether to bypass system proxy settings.
    pub disable_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            request_timeout: None,
            disable_proxy: true,
        }
    }
}

impl TransportConfig {
    /// Create a config for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load the config from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Request timeout in seconds (default: none)
    pub fn from_env() -> Self {
        let url = env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let request_timeout = env::var("OPENSEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|value| match value.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(e) => {
                    warn!(value = %value, error = %e, "Ignoring invalid OPENSEARCH_TIMEOUT_SECS");
                    None
                }
            });

        Self {
            url,
            request_timeout,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.url, "http://localhost:9200");
        assert!(config.request_timeout.is_none());
        assert!(config.disable_proxy);
    }

    #[test]
    fn test_builder() {
        let config = TransportConfig::new("http://search:9200").with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.url, "http://search:9200");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }
}
