//! JSON-RPC over stdio transport.
//!
//! Handles low-level communication with tool server child processes:
//! - Writing JSON-RPC requests to stdin
//! - Reading JSON-RPC responses from stdout
//! - Line-delimited JSON protocol (one JSON object per line)
//!
//! A transport is owned by exactly one in-flight tool invocation, so reads
//! and writes take `&mut self` and no locking is involved.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout};

use super::errors::McpError;
use super::types::{JsonRpcRequest, JsonRpcResponse};

// ─── Request ID Generator ────────────────────────────────────────────────────

/// Global monotonic request ID counter.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID.
pub fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// JSON-RPC transport over a child process's stdio.
#[derive(Debug)]
pub struct StdioTransport {
    server_name: String,
    writer: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl StdioTransport {
    /// Create a new transport from a child process's stdin/stdout.
    pub fn new(server_name: &str, stdin: ChildStdin, stdout: ChildStdout) -> Self {
        Self {
            server_name: server_name.to_string(),
            writer: stdin,
            reader: BufReader::new(stdout),
        }
    }

    /// Send a JSON-RPC request and wait for the matching response.
    ///
    /// Writes one line of JSON, then reads lines until a response with a
    /// matching `id` appears. Non-JSON lines (server log noise) are skipped.
    pub async fn request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, McpError> {
        let id = next_request_id();
        let req = JsonRpcRequest::new(id, method, params);

        let mut json = serde_json::to_string(&req).map_err(|e| McpError::TransportError {
            server: self.server_name.clone(),
            reason: format!("failed to serialize request: {e}"),
        })?;
        json.push('\n');

        self.write_line(&json).await?;

        let mut line_buf = String::new();
        loop {
            line_buf.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line_buf)
                .await
                .map_err(|e| McpError::TransportError {
                    server: self.server_name.clone(),
                    reason: format!("failed to read from stdout: {e}"),
                })?;

            if bytes_read == 0 {
                return Err(McpError::TransportError {
                    server: self.server_name.clone(),
                    reason: "server stdout closed (process may have exited)".into(),
                });
            }

            let trimmed = line_buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonRpcResponse>(trimmed) {
                Ok(resp) if resp.id == id => return Ok(resp),
                // Response for a different request ID, or server log output —
                // skip and keep reading.
                Ok(_) | Err(_) => continue,
            }
        }
    }

    /// Send a JSON-RPC notification (no response expected).
    pub async fn notify(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), McpError> {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        let mut json =
            serde_json::to_string(&notification).map_err(|e| McpError::TransportError {
                server: self.server_name.clone(),
                reason: format!("failed to serialize notification: {e}"),
            })?;
        json.push('\n');

        self.write_line(&json).await
    }

    /// Write a pre-serialized line to the server's stdin and flush it.
    async fn write_line(&mut self, json: &str) -> Result<(), McpError> {
        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| McpError::TransportError {
                server: self.server_name.clone(),
                reason: format!("failed to write to stdin: {e}"),
            })?;
        self.writer
            .flush()
            .await
            .map_err(|e| McpError::TransportError {
                server: self.server_name.clone(),
                reason: format!("failed to flush stdin: {e}"),
            })
    }
}

// ─── Response Helpers ────────────────────────────────────────────────────────

/// Extract the result from a JSON-RPC response, converting errors to `McpError`.
pub fn extract_result(response: JsonRpcResponse) -> Result<serde_json::Value, McpError> {
    if let Some(err) = response.error {
        return Err(McpError::ServerError {
            code: err.code,
            message: err.message,
            data: err.data,
        });
    }

    response.result.ok_or(McpError::ServerError {
        code: -32603,
        message: "response missing both result and error".into(),
        data: None,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
