//! The interactive session loop.
//!
//! One user turn is fully routed, dispatched, and reported before the next
//! line is read: AwaitingInput → Routing → Executing → Reporting, terminal
//! on an exit token. A routing or backend failure is caught at the top of
//! the loop, logged, and surfaced as a short message — the session itself
//! never dies because of one.
//!
//! The loop reads from an injected `BufRead` and writes to an injected
//! `Write`, and every turn, tool invocation, and failure is appended to an
//! injectable [`SessionLog`] — no process-wide state, so tests drive whole
//! sessions against in-memory buffers.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::inference::client::CompletionBackend;

use super::conversation::ConversationHistory;
use super::dispatch::ToolRegistry;
use super::errors::SessionError;
use super::intent::{Intent, ToolAction};
use super::parser::IntentParser;
use super::summarize::summarize;

// ─── Constants ───────────────────────────────────────────────────────────────

/// System note seeding every conversation.
pub const SYSTEM_NOTE: &str = "Eres un asistente técnico para un prototipo de consola. \
     Responde de forma breve y directa, con pasos reproducibles cuando proceda.";

/// Greeting printed when the session starts.
const BANNER: &str = "Chat listo. Escribe 'salir' para terminar.";

/// Message printed when the session ends.
const FAREWELL: &str = "Fin de la sesión.";

/// Inputs that end the session, compared case-insensitively.
const EXIT_TOKENS: [&str; 3] = ["salir", "exit", "quit"];

/// Maximum characters of a tool result kept in the session log.
const PREVIEW_LIMIT: usize = 800;

// ─── SessionLog ──────────────────────────────────────────────────────────────

/// Append-only, session-scoped log sink.
///
/// Content is diagnostic only and never parsed back. The sink is injected so
/// tests can hand in a shared buffer instead of a file.
pub struct SessionLog {
    sink: Box<dyn Write + Send>,
}

impl SessionLog {
    /// Wrap an arbitrary sink.
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self { sink }
    }

    /// Open `logs/session-YYYYMMDD-HHMMSS.log` under the given directory.
    pub fn to_file(dir: &Path) -> std::io::Result<(Self, PathBuf)> {
        std::fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("session-{stamp}.log"));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let mut log = Self::new(Box::new(file));
        log.info(format!("session {} started", uuid::Uuid::new_v4()));
        Ok((log, path))
    }

    /// Append an informational entry.
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.write_line("INFO", message.as_ref());
    }

    /// Append an error entry.
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.write_line("ERROR", message.as_ref());
    }

    /// Write one timestamped line; logging failures are swallowed — the log
    /// must never take the session down.
    fn write_line(&mut self, level: &str, message: &str) {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.sink, "{stamp} | {level} | {message}");
        let _ = self.sink.flush();
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Interactive routing session: conversation history, intent parser, tool
/// registry, and log sink, with history exclusively owned here.
pub struct Session<B> {
    parser: IntentParser<B>,
    registry: ToolRegistry,
    history: ConversationHistory,
    log: SessionLog,
}

impl<B: CompletionBackend> Session<B> {
    /// Assemble a session around a completion backend and a tool registry.
    pub fn new(backend: B, registry: ToolRegistry, log: SessionLog) -> Self {
        Self {
            parser: IntentParser::new(backend),
            registry,
            history: ConversationHistory::with_system(SYSTEM_NOTE),
            log,
        }
    }

    /// The conversation so far.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run the read-eval-print loop until an exit token (or EOF).
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> std::io::Result<()> {
        writeln!(output, "{BANNER}")?;
        writeln!(output)?;

        loop {
            write!(output, "Tú: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF behaves like an exit token
                writeln!(output, "{FAREWELL}")?;
                return Ok(());
            }

            let user_text = line.trim();
            if user_text.is_empty() {
                continue;
            }
            if is_exit_token(user_text) {
                writeln!(output, "{FAREWELL}")?;
                return Ok(());
            }

            self.log.info(format!("user: {user_text}"));
            tracing::info!(chars = user_text.len(), "user turn");

            match self.handle_turn(user_text, &mut output).await {
                Ok(()) => {}
                Err(SessionError::Io(e)) => return Err(e),
                Err(e) => {
                    tracing::error!(error = %e, "turn failed");
                    self.log.error(format!("dispatch-error | {e}"));
                    let message = format!("Ocurrió un error al procesar la solicitud: {e}");
                    self.history.push_assistant(&message);
                    reply(&mut output, &message)?;
                }
            }
        }
    }

    /// Route, execute, and report one user turn.
    async fn handle_turn<W: Write>(
        &mut self,
        user_text: &str,
        output: &mut W,
    ) -> Result<(), SessionError> {
        self.history.push_user(user_text);

        let intent = self.parser.parse_intent(&self.history, user_text).await?;
        self.log.info(format!("router-intent: {intent:?}"));

        match intent {
            Intent::Respond { text } => {
                self.history.push_assistant(&text);
                reply(output, &text)?;
            }
            Intent::CallTool { tool, args } => {
                let summary = self.execute_action(&tool, args).await?;
                self.history.push_assistant(&summary);
                reply(output, &summary)?;
            }
            Intent::Batch { actions } => {
                // Execute-and-forget: sub-results are printed, not appended
                // to history, and a failing step never blocks the steps
                // after it.
                for ToolAction { tool, args } in actions {
                    match self.execute_action(&tool, args).await {
                        Ok(summary) => reply(output, &summary)?,
                        Err(e) => {
                            tracing::error!(tool = %tool, error = %e, "batch step failed");
                            self.log.error(format!("tool-err | tool={tool} | err={e}"));
                            reply(output, &format!("Ocurrió un error al ejecutar {tool}: {e}"))?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Dispatch one action and reduce its result to a summary.
    ///
    /// Unknown tools are reported as omitted; backend failures bubble up to
    /// the caller, which decides whether they end the turn (single call) or
    /// just one step (batch).
    async fn execute_action(
        &mut self,
        tool: &str,
        args: Value,
    ) -> Result<String, crate::mcp::McpError> {
        let start = Instant::now();
        self.log.info(format!("tool-req | tool={tool} | args={args}"));

        match self.registry.dispatch(tool, args).await {
            None => {
                tracing::warn!(tool, "unknown tool requested");
                self.log.info(format!("tool-skip | tool={tool} | not in registry"));
                Ok(format!("{tool}: acción omitida."))
            }
            Some(Ok(result)) => {
                let ms = start.elapsed().as_millis() as u64;
                let preview = truncate_preview(&result.raw_text(), PREVIEW_LIMIT);
                self.log
                    .info(format!("tool-res | tool={tool} | ms={ms} | result={preview}"));
                Ok(summarize(tool, &result))
            }
            Some(Err(e)) => {
                tracing::error!(tool, ms = start.elapsed().as_millis() as u64, error = %e, "tool call failed");
                Err(e)
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Whether a trimmed input line ends the session.
fn is_exit_token(input: &str) -> bool {
    EXIT_TOKENS
        .iter()
        .any(|token| input.eq_ignore_ascii_case(token))
}

/// Print an assistant reply followed by a blank line.
fn reply<W: Write>(output: &mut W, text: &str) -> std::io::Result<()> {
    writeln!(output, "Asistente: {text}")?;
    writeln!(output)
}

/// Truncate a string to a character budget, marking the cut.
fn truncate_preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...[truncado]")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
