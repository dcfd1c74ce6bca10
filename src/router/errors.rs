//! Router error types.

use thiserror::Error;

use crate::inference::errors::InferenceError;
use crate::mcp::errors::McpError;

/// Failures the session loop has to recover from or propagate.
///
/// Inference and backend failures are caught at the top of the loop and
/// surfaced to the user; I/O failures on the console itself end the run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The language-model backend failed at the transport level.
    #[error("{0}")]
    Inference(#[from] InferenceError),

    /// A tool backend failed.
    #[error("{0}")]
    Backend(#[from] McpError),

    /// Reading user input or writing console output failed.
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}
