//! Backend error types.

use thiserror::Error;

/// Errors that can occur while talking to a tool backend.
#[derive(Debug, Error)]
pub enum McpError {
    /// A server process failed to start.
    #[error("failed to spawn server '{name}': {reason}")]
    SpawnFailed { name: String, reason: String },

    /// The initialization handshake failed.
    #[error("server '{name}' initialization failed: {reason}")]
    InitFailed { name: String, reason: String },

    /// JSON-RPC communication error (malformed message, I/O error).
    #[error("transport error for server '{server}': {reason}")]
    TransportError { server: String, reason: String },

    /// Server returned a JSON-RPC error response.
    #[error("server error [{code}]: {message}")]
    ServerError {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// A tool call timed out.
    #[error("tool call '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    /// Non-2xx HTTP response from the remote endpoint.
    #[error("remote endpoint {endpoint} returned HTTP {status}: {body}")]
    HttpError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Configuration error (bad URL, missing command).
    #[error("config error: {reason}")]
    ConfigError { reason: String },
}
