//! Intent router and tool-dispatch core.
//!
//! Submodules:
//! - `conversation`: append-only history with a bounded prompt window
//! - `extract`: best-effort JSON extraction from free-form text
//! - `intent`: the three-way intent shape and tolerant interpretation
//! - `parser`: system prompt assembly + model call + coercion
//! - `dispatch`: fixed name → invocation registry with a no-op sentinel
//! - `tools`: the eight catalog tools over their backends
//! - `normalize`: closed tool-result shape and payload extraction
//! - `summarize`: per-tool user-facing summaries
//! - `session`: the interactive loop that owns history and the log
//! - `errors`: session-level error types

pub mod conversation;
pub mod dispatch;
pub mod errors;
pub mod extract;
pub mod intent;
pub mod normalize;
pub mod parser;
pub mod session;
pub mod summarize;
pub mod tools;

pub use conversation::{ConversationHistory, ConversationTurn};
pub use dispatch::{Tool, ToolRegistry};
pub use errors::SessionError;
pub use intent::Intent;
pub use normalize::ToolOutput;
pub use session::{Session, SessionLog};
