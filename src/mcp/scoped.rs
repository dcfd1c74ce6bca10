//! Per-call server lifecycle.
//!
//! Each tool invocation owns its server process for the duration of a single
//! call: spawn → initialize → call → shutdown. Nothing is pooled or reused
//! across turns, so a crashed server can never poison a later invocation.

use std::time::{Duration, Instant};

use tokio::process::{Child, Command};

use super::errors::McpError;
use super::transport::{extract_result, StdioTransport};
use super::types::ServerConfig;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Timeout for the initialize handshake.
const INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single tool call.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for graceful shutdown before force-killing.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// ─── ScopedServer ────────────────────────────────────────────────────────────

/// A tool server process held for the span of one invocation.
#[derive(Debug)]
pub struct ScopedServer {
    name: String,
    process: Child,
    transport: StdioTransport,
}

impl ScopedServer {
    /// Spawn a server process and perform the initialization handshake.
    pub async fn start(name: &str, config: &ServerConfig) -> Result<Self, McpError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &config.cwd {
            cmd.current_dir(dir);
        }

        // Wire stdio for JSON-RPC; stderr is captured for failure diagnosis
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| McpError::SpawnFailed {
            name: name.to_string(),
            reason: format!("{e}"),
        })?;

        let stdin = child.stdin.take().ok_or(McpError::SpawnFailed {
            name: name.to_string(),
            reason: "failed to capture stdin".into(),
        })?;
        let stdout = child.stdout.take().ok_or(McpError::SpawnFailed {
            name: name.to_string(),
            reason: "failed to capture stdout".into(),
        })?;
        let stderr_handle = child.stderr.take();

        let mut transport = StdioTransport::new(name, stdin, stdout);

        match tokio::time::timeout(INIT_TIMEOUT, transport.request("initialize", None)).await {
            Ok(Ok(response)) => {
                // Result contents (capabilities, tool listings) are not needed:
                // the tool catalog here is fixed at compile time.
                extract_result(response).map_err(|e| McpError::InitFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
            }
            Ok(Err(e)) => {
                let stderr_ctx = read_stderr_on_failure(stderr_handle).await;
                let _ = child.kill().await;
                return Err(McpError::InitFailed {
                    name: name.to_string(),
                    reason: format!("{e}{}", format_stderr_suffix(&stderr_ctx)),
                });
            }
            Err(_) => {
                let stderr_ctx = read_stderr_on_failure(stderr_handle).await;
                let _ = child.kill().await;
                return Err(McpError::InitFailed {
                    name: name.to_string(),
                    reason: format!(
                        "initialization timed out after {}s{}",
                        INIT_TIMEOUT.as_secs(),
                        format_stderr_suffix(&stderr_ctx)
                    ),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            process: child,
            transport,
        })
    }

    /// Execute a `tools/call` request against the running server.
    pub async fn call_tool(
        &mut self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, McpError> {
        let start = Instant::now();
        let params = serde_json::json!({
            "name": tool,
            "arguments": arguments,
        });

        let response = tokio::time::timeout(
            CALL_TIMEOUT,
            self.transport.request("tools/call", Some(params)),
        )
        .await
        .map_err(|_| McpError::Timeout {
            tool: tool.to_string(),
            timeout_ms: CALL_TIMEOUT.as_millis() as u64,
        })??;

        let result = extract_result(response)?;
        tracing::info!(
            server = %self.name,
            tool,
            ms = start.elapsed().as_millis() as u64,
            "tool call completed"
        );
        Ok(result)
    }

    /// Attempt to gracefully shut down the server, force-killing on timeout.
    pub async fn shutdown(mut self) {
        let _ = self.transport.notify("shutdown", None).await;

        let result = tokio::time::timeout(SHUTDOWN_TIMEOUT, self.process.wait()).await;
        if !matches!(result, Ok(Ok(_))) {
            let _ = self.process.kill().await;
        }
    }

    /// One-shot convenience: spawn, call a single tool, shut down.
    ///
    /// This is the acquisition pattern every subprocess-backed tool uses —
    /// the server's connection is held for exactly one call and released
    /// whether the call succeeds or fails.
    pub async fn call_once(
        name: &str,
        config: &ServerConfig,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, McpError> {
        let mut server = Self::start(name, config).await?;
        let result = server.call_tool(tool, arguments).await;
        server.shutdown().await;
        result
    }
}

// ─── Failure Diagnostics ─────────────────────────────────────────────────────

/// Read any available stderr output from a failed server process.
///
/// Uses a short timeout to avoid blocking if stderr is empty or the process
/// is still writing. Truncates to 2000 chars to keep log messages readable.
async fn read_stderr_on_failure(stderr_handle: Option<tokio::process::ChildStderr>) -> String {
    use tokio::io::AsyncReadExt;

    let Some(mut stderr) = stderr_handle else {
        return String::new();
    };

    let mut buf = String::new();
    match tokio::time::timeout(Duration::from_millis(500), stderr.read_to_string(&mut buf)).await {
        Ok(Ok(_)) => {
            if buf.len() > 2000 {
                buf.truncate(2000);
                buf.push_str("...(truncated)");
            }
            buf
        }
        _ => String::new(),
    }
}

/// Format a stderr suffix for error messages (empty string if no stderr).
fn format_stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" | stderr: {}", stderr.trim())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
