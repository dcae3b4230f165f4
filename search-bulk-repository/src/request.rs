//! Requests sent to the search engine and the raw responses they produce.
//!
//! Also hosts the parsing and formatting helpers used when reporting
//! failures.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

use crate::errors::ClientError;

/// HTTP method of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the search engine.
///
/// The body is a sequence of JSON documents. Single-document requests have
/// one part; bulk requests have one or two parts per work and are sent as
/// newline-delimited JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    method: HttpMethod,
    path: String,
    params: BTreeMap<String, String>,
    body_parts: Vec<Value>,
}

impl SearchRequest {
    /// Start building a `POST` request.
    pub fn post() -> SearchRequestBuilder {
        SearchRequestBuilder::new(HttpMethod::Post)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The request path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string parameters.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Look up a single query string parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The body documents, in order.
    pub fn body_parts(&self) -> &[Value] {
        &self.body_parts
    }

    /// Render the body as newline-delimited JSON, with a trailing newline.
    pub fn ndjson_body(&self) -> String {
        let mut body = String::new();
        for part in &self.body_parts {
            body.push_str(&part.to_string());
            body.push('\n');
        }
        body
    }
}

/// Builder for [`SearchRequest`].
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    method: HttpMethod,
    path_components: Vec<String>,
    params: BTreeMap<String, String>,
    body_parts: Vec<Value>,
}

impl SearchRequestBuilder {
    fn new(method: HttpMethod) -> Self {
        Self {
            method,
            path_components: Vec::new(),
            params: BTreeMap::new(),
            body_parts: Vec::new(),
        }
    }

    /// Append a component to the request path.
    pub fn path_component(mut self, component: impl Into<String>) -> Self {
        self.path_components.push(component.into());
        self
    }

    /// Set a query string parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Append a document to the body.
    pub fn body(mut self, part: Value) -> Self {
        self.body_parts.push(part);
        self
    }

    pub fn build(self) -> SearchRequest {
        SearchRequest {
            method: self.method,
            path: format!("/{}", self.path_components.join("/")),
            params: self.params,
            body_parts: self.body_parts,
        }
    }
}

/// A response as returned by the transport, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Parse a response body into a JSON document.
///
/// An empty body parses to an empty object. A body that is not a JSON object
/// is a transport error, so the caller reports it along with the request.
pub fn parse_json_response(response: &RawResponse) -> Result<Value, ClientError> {
    if response.body.trim().is_empty() {
        return Ok(json!({}));
    }
    let parsed: Value = serde_json::from_str(&response.body).map_err(ClientError::transport)?;
    if !parsed.is_object() {
        return Err(ClientError::transport(format!(
            "expected a JSON object in the response body, got {}",
            parsed
        )));
    }
    Ok(parsed)
}

/// Render a request for diagnostics: the request line, then one body part per line.
pub fn format_request(request: &SearchRequest) -> String {
    let mut formatted = format!("{} {}", request.method, request.path);
    let query: Vec<String> = request
        .params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    if !query.is_empty() {
        formatted.push('?');
        formatted.push_str(&query.join("&"));
    }
    for part in &request.body_parts {
        formatted.push('\n');
        formatted.push_str(&part.to_string());
    }
    formatted
}

/// Render whatever is known about a response for diagnostics.
///
/// Prefers the parsed body; falls back to the raw text when parsing did not
/// happen or failed.
pub fn format_response(response: Option<&RawResponse>, parsed: Option<&Value>) -> String {
    let Some(response) = response else {
        return "<no response>".to_string();
    };
    match parsed {
        Some(body) => format!("status {}\n{}", response.status, body),
        None => format!("status {}\n{}", response.status, response.body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_joins_path_components() {
        let request = SearchRequest::post()
            .path_component("entities")
            .path_component("_bulk")
            .build();

        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.path(), "/entities/_bulk");
        assert!(request.params().is_empty());
    }

    #[test]
    fn test_ndjson_body() {
        let request = SearchRequest::post()
            .path_component("_bulk")
            .body(json!({"delete": {"_index": "entities", "_id": "1"}}))
            .body(json!({"index": {"_index": "entities", "_id": "2"}}))
            .body(json!({"name": "Two"}))
            .build();

        assert_eq!(
            request.ndjson_body(),
            "{\"delete\":{\"_id\":\"1\",\"_index\":\"entities\"}}\n\
             {\"index\":{\"_id\":\"2\",\"_index\":\"entities\"}}\n\
             {\"name\":\"Two\"}\n"
        );
    }

    #[test]
    fn test_parse_empty_body() {
        let response = RawResponse::new(200, "  ");
        assert_eq!(parse_json_response(&response).unwrap(), json!({}));
    }

    #[test]
    fn test_parse_invalid_body_is_transport_error() {
        let response = RawResponse::new(502, "<html>Bad Gateway</html>");
        let err = parse_json_response(&response).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_parse_non_object_body_is_transport_error() {
        for body in ["[1,2]", "\"ok\"", "42"] {
            let response = RawResponse::new(200, body);
            let err = parse_json_response(&response).unwrap_err();
            assert!(matches!(err, ClientError::Transport(_)), "body {body} was accepted");
        }
    }

    #[test]
    fn test_parse_object_body() {
        let response = RawResponse::new(200, r#"{"errors": false, "items": []}"#);
        let parsed = parse_json_response(&response).unwrap();
        assert_eq!(parsed, json!({"errors": false, "items": []}));
    }

    #[test]
    fn test_format_request() {
        let request = SearchRequest::post()
            .path_component("_bulk")
            .param("refresh", true)
            .body(json!({"delete": {"_index": "entities", "_id": "1"}}))
            .build();

        assert_eq!(
            format_request(&request),
            "POST /_bulk?refresh=true\n{\"delete\":{\"_id\":\"1\",\"_index\":\"entities\"}}"
        );
    }

    #[test]
    fn test_format_response() {
        let response = RawResponse::new(500, "oops");
        assert_eq!(format_response(None, None), "<no response>");
        assert_eq!(format_response(Some(&response), None), "status 500\noops");
        assert_eq!(
            format_response(Some(&response), Some(&json!({"errors": true}))),
            "status 500\n{\"errors\":true}"
        );
    }
}
