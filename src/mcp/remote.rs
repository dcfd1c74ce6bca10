//! JSON-RPC over HTTP for the remote hello endpoint.
//!
//! The remote service exposes `health` and `echo` methods behind a plain
//! JSON-RPC POST endpoint. Unlike the stdio servers there is no process to
//! manage — one HTTP round trip per call.

use std::time::Duration;

use reqwest::Client as HttpClient;

use super::errors::McpError;
use super::transport::{extract_result, next_request_id};
use super::types::{JsonRpcRequest, JsonRpcResponse};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ─── RemoteEndpoint ──────────────────────────────────────────────────────────

/// Client for the remote JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    http: HttpClient,
    url: String,
}

impl RemoteEndpoint {
    /// Build a client for the given endpoint URL.
    pub fn new(url: &str) -> Result<Self, McpError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| McpError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Send one JSON-RPC request and return its `result` payload.
    pub async fn call(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, McpError> {
        let req = JsonRpcRequest::new(next_request_id(), method, params);

        let response = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| McpError::TransportError {
                server: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::HttpError {
                endpoint: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: JsonRpcResponse =
            response.json().await.map_err(|e| McpError::TransportError {
                server: self.url.clone(),
                reason: format!("failed to parse JSON-RPC response: {e}"),
            })?;

        extract_result(parsed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_url() {
        let endpoint = RemoteEndpoint::new("https://example.com/rpc").unwrap();
        assert_eq!(endpoint.url, "https://example.com/rpc");
    }

    #[tokio::test]
    async fn test_call_unreachable_host_is_transport_error() {
        // Reserved TEST-NET address — nothing listens there.
        let endpoint = RemoteEndpoint::new("http://192.0.2.1:1/rpc").unwrap();
        let err = endpoint.call("health", None).await.unwrap_err();
        assert!(matches!(err, McpError::TransportError { .. }));
    }
}
