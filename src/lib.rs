//! CertTrack console assistant.
//!
//! An LLM router over MCP tool backends: free-form user text goes in, the
//! model decides between answering directly and invoking tools from a fixed
//! catalog, and every tool result comes back as a short summary. Backend
//! and parse failures degrade; they never end the session.

pub mod config;
pub mod inference;
pub mod mcp;
pub mod router;

use std::path::Path;

/// Initialize the tracing subscriber — structured diagnostics go to a
/// rotating `trace.log` in the log directory.
///
/// On each startup:
/// 1. Rotates existing logs (trace.log → trace.log.1 → .2 → .3, keeps last 3).
/// 2. Opens a fresh trace.log with a line-flushing writer for crash resilience.
/// 3. Logs a startup banner with the session id for discoverability.
///
/// The user-facing session log is separate (`router::SessionLog`) — tracing
/// output is developer diagnostics only.
pub fn init_tracing(log_dir: &Path) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let _ = std::fs::create_dir_all(log_dir);
    let log_path = log_dir.join("trace.log");

    // Rotate: trace.log.2 → .3, .1 → .2, trace.log → .1
    rotate_log_file(&log_path, 3);

    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        // No writable log dir — fall back to stderr rather than aborting
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("certtrack=info,warn"));
        fmt::fmt().with_env_filter(filter).with_ansi(false).init();
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("certtrack=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(FlushingWriter::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        session_id = %uuid::Uuid::new_v4(),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== CertTrack assistant starting ==="
    );
}

/// Rotate log files: `trace.log` → `trace.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
///
/// `tracing-subscriber` buffers log output internally. Without explicit
/// flushing, log entries may sit in OS buffers and be lost on crash.
#[derive(Clone)]
struct FlushingWriter {
    file: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: std::sync::Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
