//! OpenSearch transport implementation.

use async_trait::async_trait;
use opensearch::{
    http::{
        headers::HeaderMap,
        request::{JsonBody, NdBody},
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    OpenSearch,
};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::TransportConfig;
use crate::errors::{ClientError, SearchError};
use crate::interfaces::SearchTransport;
use crate::request::{HttpMethod, RawResponse, SearchRequest};

/// Sends requests to a single OpenSearch node.
///
/// Request bodies are sent as newline-delimited JSON, which is what the
/// `_bulk` endpoint expects.
///
/// # Example
///
/// ```ignore
/// let transport = OpenSearchTransport::new(&TransportConfig::new("http://localhost:9200"))?;
/// let context = DefaultWorkExecutionContext::new(Arc::new(transport));
/// BulkWork::builder(works).refresh(true).build()?.execute(&context).await?;
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
    request_timeout: Option<Duration>,
}

impl OpenSearchTransport {
    /// Create a new transport connected to the configured URL.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport instance
    /// * `Err(SearchError::ConnectionError)` - If the URL is invalid or connection setup fails
    pub fn new(config: &TransportConfig) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool);
        if config.disable_proxy {
            builder = builder.disable_proxy();
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %config.url,
            timeout_secs = config.request_timeout.map(|t| t.as_secs()),
            "Created OpenSearch transport"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            request_timeout: config.request_timeout,
        })
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::Get,
            HttpMethod::Post => Method::Post,
            HttpMethod::Put => Method::Put,
            HttpMethod::Delete => Method::Delete,
        }
    }
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    async fn execute(&self, request: &SearchRequest) -> Result<RawResponse, ClientError> {
        let body = if request.body_parts().is_empty() {
            None
        } else {
            let parts: Vec<JsonBody<serde_json::Value>> = request
                .body_parts()
                .iter()
                .cloned()
                .map(JsonBody::new)
                .collect();
            Some(NdBody::new(parts))
        };

        let response = self
            .client
            .transport()
            .send(
                Self::method(request.method()),
                request.path(),
                HeaderMap::new(),
                Some(request.params()),
                body,
                self.request_timeout,
            )
            .await
            .map_err(ClientError::transport)?;

        let status = response.status_code().as_u16();
        let body = response.text().await.map_err(ClientError::transport)?;

        debug!(
            method = %request.method(),
            path = %request.path(),
            status = status,
            "OpenSearch request completed"
        );

        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchTransport::new(&TransportConfig::new("not a url"));
        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
    }

    #[test]
    fn test_new_accepts_valid_url() {
        let result = OpenSearchTransport::new(&TransportConfig::new("http://localhost:9200"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(OpenSearchTransport::method(HttpMethod::Post), Method::Post);
        assert_eq!(OpenSearchTransport::method(HttpMethod::Delete), Method::Delete);
    }
}
