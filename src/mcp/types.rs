//! Shared types for the backend layer.
//!
//! JSON-RPC 2.0 message types used by both the stdio and the HTTP transport,
//! plus the configuration for spawning tool server processes.

use serde::{Deserialize, Serialize};

// ─── JSON-RPC 2.0 ───────────────────────────────────────────────────────────

/// JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: u64, method: &str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

// ─── Server Configuration ────────────────────────────────────────────────────

/// How to spawn a tool server child process.
///
/// Servers are not long-lived here: each tool invocation spawns its server,
/// performs the handshake and the call, and shuts the process down again.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Executable to run (e.g., `"python"`, `"npx"`).
    pub command: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Extra environment variables for the child process.
    pub env: std::collections::HashMap<String, String>,
    /// Working directory for the child process.
    pub cwd: Option<String>,
}

impl ServerConfig {
    /// Convenience constructor for a command + args pair.
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env: std::collections::HashMap::new(),
            cwd: None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
