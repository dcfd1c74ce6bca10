//! Runtime configuration.
//!
//! All settings come from the environment, mirroring the prototype's `.env`
//! deployment. `Config::from_env` is a thin wrapper over `from_lookup`,
//! which takes the variable source as a closure so resolution is testable
//! without mutating process state.

use std::path::PathBuf;

use thiserror::Error;

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Default chat completions endpoint (Groq, OpenAI-compatible).
const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model served by the endpoint.
const DEFAULT_LLM_MODEL: &str = "gemma2-9b-it";

/// Default remote JSON-RPC endpoint for the hello service.
const DEFAULT_REMOTE_MCP_URL: &str =
    "https://hello-mcp-remote-203021435289.us-central1.run.app/rpc";

/// Default reply budget for the router model.
const DEFAULT_MAX_TOKENS: u32 = 450;

/// Default sampling temperature — low, routing should be deterministic.
const DEFAULT_TEMPERATURE: f32 = 0.2;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Configuration resolution failure.
#[derive(Debug, Error)]
#[error("config error: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Resolved runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat completions endpoint URL.
    pub llm_url: String,
    /// Model name sent in completion requests.
    pub llm_model: String,
    /// Bearer token for the LLM endpoint (`GROQ_API_KEY`).
    pub api_key: String,
    /// Root directory the filesystem and git tools operate under.
    pub sandbox_root: PathBuf,
    /// Default repository for `git_add_commit`.
    pub repo_path: PathBuf,
    /// Remote JSON-RPC endpoint for `remote_health` / `remote_echo`.
    pub remote_mcp_url: String,
    /// Directory session logs are written to.
    pub log_dir: PathBuf,
    /// Reply token budget for the router model.
    pub max_tokens: u32,
    /// Sampling temperature for the router model.
    pub temperature: f32,
}

impl Config {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GROQ_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError {
                reason: "GROQ_API_KEY is not set".into(),
            })?;

        let sandbox_root = match lookup("SANDBOX_ROOT").filter(|v| !v.trim().is_empty()) {
            Some(root) => PathBuf::from(root),
            None => default_sandbox_root(),
        };

        let repo_path = match lookup("REPO_PATH").filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => sandbox_root.join("demo-repo"),
        };

        let remote_mcp_url = lookup("REMOTE_MCP_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_MCP_URL.to_string());

        let log_dir = lookup("CERTTRACK_LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        Ok(Self {
            llm_url: lookup("GROQ_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
            llm_model: lookup("GROQ_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_key,
            sandbox_root,
            repo_path,
            remote_mcp_url,
            log_dir,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// A fully-populated configuration for unit tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            llm_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            api_key: "test-key".to_string(),
            sandbox_root: PathBuf::from("/tmp/mcp-sandbox"),
            repo_path: PathBuf::from("/tmp/mcp-sandbox/demo-repo"),
            remote_mcp_url: DEFAULT_REMOTE_MCP_URL.to_string(),
            log_dir: PathBuf::from("logs"),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// `~/mcp-sandbox`, falling back to a relative directory when the home
/// directory cannot be resolved.
fn default_sandbox_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mcp-sandbox")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
