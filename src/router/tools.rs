//! The catalog tools.
//!
//! Eight tools over three backends: the certtrack server (certification
//! CRUD + mail), the filesystem and git servers (sandbox writes and
//! commits), and the remote hello endpoint (health/echo). Each tool
//! validates and defaults its own arguments — a missing optional argument
//! never raises here, only a backend's own validation may reject it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::mcp::{McpError, RemoteEndpoint, ScopedServer, ServerConfig};

use super::dispatch::{Tool, ToolRegistry};
use super::normalize::ToolOutput;

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Day threshold used when `upcoming_expirations` gets no count.
const DEFAULT_DAYS_BEFORE: u64 = 30;

/// Commit message used when `git_add_commit` gets none.
const DEFAULT_COMMIT_MESSAGE: &str = "Update via MCP";

// ─── Server Configurations ───────────────────────────────────────────────────

/// The certtrack stdio server (certification store + mail sender).
fn certtrack_server() -> ServerConfig {
    ServerConfig::new("python", &["-m", "certtrack_mcp.server"])
}

/// The filesystem stdio server, rooted at the sandbox.
fn filesystem_server(sandbox_root: &Path) -> ServerConfig {
    let root = sandbox_root.to_string_lossy();
    ServerConfig::new(
        "npx",
        &[
            "-y",
            "--silent",
            "@modelcontextprotocol/server-filesystem",
            root.as_ref(),
        ],
    )
}

/// The git stdio server for a specific repository.
fn git_server(repo_path: &Path) -> ServerConfig {
    let repo = repo_path.to_string_lossy();
    ServerConfig::new(
        "python",
        &["-m", "mcp_server_git", "--repository", repo.as_ref()],
    )
}

// ─── Registry Construction ───────────────────────────────────────────────────

/// Build the fixed tool registry for a session.
pub fn build_registry(config: &Config) -> Result<ToolRegistry, McpError> {
    let remote = RemoteEndpoint::new(&config.remote_mcp_url)?;

    let mut registry = ToolRegistry::new();
    registry.register(ListMyCerts);
    registry.register(AddCert);
    registry.register(UpcomingExpirations);
    registry.register(SendEmail);
    registry.register(FsWrite {
        sandbox_root: config.sandbox_root.clone(),
    });
    registry.register(GitAddCommit {
        sandbox_root: config.sandbox_root.clone(),
        default_repo: config.repo_path.clone(),
    });
    registry.register(RemoteHealth {
        endpoint: remote.clone(),
    });
    registry.register(RemoteEcho { endpoint: remote });
    Ok(registry)
}

// ─── CertTrack Tools ─────────────────────────────────────────────────────────

/// `list_my_certs(nombre)` — look up certifications by person.
struct ListMyCerts;

#[async_trait]
impl Tool for ListMyCerts {
    fn name(&self) -> &'static str {
        "list_my_certs"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let nombre = arg_str(&args, "nombre");
        let result = ScopedServer::call_once(
            "certtrack",
            &certtrack_server(),
            "list_my_certs",
            json!({"spreadsheet_id": "local", "nombre": nombre}),
        )
        .await?;
        Ok(ToolOutput::from_value(result))
    }
}

/// `add_cert(row)` — insert a certification record.
struct AddCert;

#[async_trait]
impl Tool for AddCert {
    fn name(&self) -> &'static str {
        "add_cert"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let row = args.get("row").cloned().unwrap_or(Value::Object(Map::new()));
        let result = ScopedServer::call_once(
            "certtrack",
            &certtrack_server(),
            "sheets_append_cert",
            json!({"spreadsheet_id": "local", "row": row}),
        )
        .await?;
        Ok(ToolOutput::from_value(result))
    }
}

/// `upcoming_expirations(days_before)` — scan for soon-to-expire records.
struct UpcomingExpirations;

#[async_trait]
impl Tool for UpcomingExpirations {
    fn name(&self) -> &'static str {
        "upcoming_expirations"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let days_before = arg_days(&args);
        let result = ScopedServer::call_once(
            "certtrack",
            &certtrack_server(),
            "alerts_schedule_due",
            json!({"spreadsheet_id": "local", "days_before": days_before}),
        )
        .await?;
        Ok(ToolOutput::from_value(result))
    }
}

/// `send_email(to, subject, html)` — deliver a message via the mail backend.
struct SendEmail;

#[async_trait]
impl Tool for SendEmail {
    fn name(&self) -> &'static str {
        "send_email"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let result = ScopedServer::call_once(
            "certtrack",
            &certtrack_server(),
            "outlook_send_email",
            json!({
                "to": arg_str(&args, "to"),
                "subject": arg_str(&args, "subject"),
                "html": arg_str(&args, "html"),
            }),
        )
        .await?;
        Ok(ToolOutput::from_value(result))
    }
}

// ─── Filesystem / Git Tools ──────────────────────────────────────────────────

/// `fs_write(path, content)` — write a file inside the sandbox.
struct FsWrite {
    sandbox_root: PathBuf,
}

#[async_trait]
impl Tool for FsWrite {
    fn name(&self) -> &'static str {
        "fs_write"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let path = resolve_under(&self.sandbox_root, &arg_str(&args, "path"));
        let result = ScopedServer::call_once(
            "filesystem",
            &filesystem_server(&self.sandbox_root),
            "write_file",
            json!({
                "path": path.to_string_lossy(),
                "content": arg_str(&args, "content"),
            }),
        )
        .await?;
        Ok(ToolOutput::from_value(result))
    }
}

/// `git_add_commit(repo_path, files, message)` — stage, commit, and report
/// status in one server scope.
struct GitAddCommit {
    sandbox_root: PathBuf,
    default_repo: PathBuf,
}

#[async_trait]
impl Tool for GitAddCommit {
    fn name(&self) -> &'static str {
        "git_add_commit"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let repo = self.resolve_repo(&args);
        let files = normalize_repo_files(arg_files(&args), &repo);
        let message = match arg_str(&args, "message") {
            m if m.is_empty() => DEFAULT_COMMIT_MESSAGE.to_string(),
            m => m,
        };

        let mut server = ScopedServer::start("git", &git_server(&repo)).await?;
        let result = run_git_sequence(&mut server, &repo, &files, &message).await;
        server.shutdown().await;
        result
    }
}

impl GitAddCommit {
    /// Default the repo path, joining relative paths under the sandbox.
    fn resolve_repo(&self, args: &Value) -> PathBuf {
        let raw = arg_str(args, "repo_path");
        if raw.is_empty() {
            return self.default_repo.clone();
        }
        resolve_under(&self.sandbox_root, &raw)
    }
}

/// `git_add` + `git_commit` + `git_status` against one running server.
async fn run_git_sequence(
    server: &mut ScopedServer,
    repo: &Path,
    files: &[String],
    message: &str,
) -> Result<ToolOutput, McpError> {
    let repo = repo.to_string_lossy();
    server
        .call_tool("git_add", json!({"repo_path": repo, "files": files}))
        .await?;
    let commit = server
        .call_tool("git_commit", json!({"repo_path": repo, "message": message}))
        .await?;
    let status = server
        .call_tool("git_status", json!({"repo_path": repo}))
        .await?;
    Ok(ToolOutput::Structured(json!({
        "commit": commit,
        "status": status,
    })))
}

// ─── Remote Tools ────────────────────────────────────────────────────────────

/// `remote_health()` — liveness check against the remote endpoint.
struct RemoteHealth {
    endpoint: RemoteEndpoint,
}

#[async_trait]
impl Tool for RemoteHealth {
    fn name(&self) -> &'static str {
        "remote_health"
    }

    async fn invoke(&self, _args: Value) -> Result<ToolOutput, McpError> {
        let result = self.endpoint.call("health", None).await?;
        Ok(ToolOutput::from_value(result))
    }
}

/// `remote_echo(msg)` — round-trip a message through the remote endpoint.
struct RemoteEcho {
    endpoint: RemoteEndpoint,
}

#[async_trait]
impl Tool for RemoteEcho {
    fn name(&self) -> &'static str {
        "remote_echo"
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, McpError> {
        let result = self
            .endpoint
            .call("echo", Some(json!({"msg": arg_str(&args, "msg")})))
            .await?;
        Ok(ToolOutput::from_value(result))
    }
}

// ─── Argument Helpers ────────────────────────────────────────────────────────

/// String argument with an empty-string default.
fn arg_str(args: &Value, key: &str) -> String {
    args.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Day-count argument, accepting numbers or numeric strings.
fn arg_days(args: &Value) -> u64 {
    match args.get("days_before") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(DEFAULT_DAYS_BEFORE),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_DAYS_BEFORE),
        _ => DEFAULT_DAYS_BEFORE,
    }
}

/// File-list argument with an empty-list default; non-string entries are
/// dropped.
fn arg_files(args: &Value) -> Vec<String> {
    args.get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ─── Path Normalization ──────────────────────────────────────────────────────

/// Join a relative path under the given root; absolute paths pass through.
fn resolve_under(root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/// Rewrite absolute file paths to repo-relative where possible; paths
/// outside the repo and already-relative paths are kept as given.
fn normalize_repo_files(files: Vec<String>, repo: &Path) -> Vec<String> {
    files
        .into_iter()
        .map(|file| {
            let path = Path::new(&file);
            if !path.is_absolute() {
                return file;
            }
            match path.strip_prefix(repo) {
                Ok(rel) => rel.to_string_lossy().into_owned(),
                Err(_) => file,
            }
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
