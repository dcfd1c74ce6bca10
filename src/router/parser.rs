//! Intent parsing against the language model.
//!
//! Builds a bounded prompt (fixed system instruction + trailing history
//! window + the new user turn), sends it through a `CompletionBackend`, and
//! coerces the reply into an [`Intent`]. Malformed replies degrade inside
//! [`Intent::from_model_text`]; only transport-level failures surface to the
//! session loop.

use crate::inference::client::CompletionBackend;
use crate::inference::errors::InferenceError;
use crate::inference::types::{ChatMessage, Role};

use super::conversation::{ConversationHistory, HISTORY_WINDOW};
use super::intent::Intent;

// ─── Router Prompt ───────────────────────────────────────────────────────────

/// Tool names advertised in the system prompt. Kept next to the prompt text
/// so a test can assert the dispatch registry covers every advertised name.
pub const TOOL_CATALOG: [&str; 8] = [
    "list_my_certs",
    "add_cert",
    "upcoming_expirations",
    "send_email",
    "fs_write",
    "git_add_commit",
    "remote_health",
    "remote_echo",
];

/// Fixed system instruction: the tool catalog and the three output shapes.
pub const ROUTER_SYSTEM: &str = "\
Eres un asistente técnico para un prototipo de consola. \
Decide si respondes directamente o si debes invocar herramientas.\n\n\
Herramientas disponibles (no menciones que son herramientas):\n\
1) list_my_certs(nombre:str)\n\
2) add_cert(row:{id, certificacion, nombre, fecha, vigencia_meses, proveedor?, tipo?, costo?})\n\
3) upcoming_expirations(days_before:int)\n\
4) send_email(to:str, subject:str, html:str)\n\
5) fs_write(path:str, content:str)\n\
6) git_add_commit(repo_path:str, files:list[str], message:str)\n\
7) remote_health()\n\
8) remote_echo(msg:str)\n\n\
Salida obligatoria:\n\
- Si es UNA sola acción de herramienta, devuelve SOLO:\n\
{ \"action\": \"call_tool\", \"tool\": \"<nombre>\", \"args\": { ... } }\n\
- Si son VARIAS acciones, devuelve SOLO:\n\
{ \"action\": \"batch\", \"actions\": [ {\"tool\":\"<nombre>\",\"args\":{...}}, ... ] }\n\
- Si no se requiere herramienta, devuelve SOLO:\n\
{ \"action\": \"respond\", \"text\": \"<respuesta breve y clara>\" }\n\
No uses backticks ni bloques de código. Devuelve JSON puro y nada más.";

// ─── IntentParser ────────────────────────────────────────────────────────────

/// Turns user text plus conversation history into an [`Intent`].
pub struct IntentParser<B> {
    backend: B,
}

impl<B: CompletionBackend> IntentParser<B> {
    /// Wrap a completion backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Ask the model for a structured intent and parse its reply.
    ///
    /// Parse failures never propagate — they degrade to `Respond` with the
    /// raw text. Transport failures do propagate; the session loop owns
    /// recovery for those.
    pub async fn parse_intent(
        &self,
        history: &ConversationHistory,
        user_text: &str,
    ) -> Result<Intent, InferenceError> {
        let messages = build_messages(history, user_text);
        let raw = self.backend.complete(messages).await?;
        Ok(Intent::from_model_text(&raw))
    }
}

/// Assemble the bounded prompt: system instruction, the last
/// [`HISTORY_WINDOW`] turns flattened to plain text, then the new user turn.
/// Turns that flatten to whitespace are skipped.
fn build_messages(history: &ConversationHistory, user_text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
    messages.push(ChatMessage::new(Role::System, ROUTER_SYSTEM));

    for turn in history.recent(HISTORY_WINDOW) {
        let content = turn.flatten();
        if content.trim().is_empty() {
            continue;
        }
        messages.push(ChatMessage::new(turn.role, content));
    }

    messages.push(ChatMessage::new(Role::User, user_text));
    messages
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    /// Backend that replies with a canned string and records the request.
    struct CannedBackend {
        reply: String,
        seen: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl CannedBackend {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, InferenceError> {
            self.seen.lock().unwrap().push(messages);
            Ok(self.reply.clone())
        }
    }

    /// Backend that always fails at the transport level.
    struct DownBackend;

    #[async_trait]
    impl CompletionBackend for DownBackend {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, InferenceError> {
            Err(InferenceError::ConnectionFailed {
                endpoint: "http://localhost:0".into(),
                reason: "refused".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_parse_intent_well_formed_call_tool() {
        let parser = IntentParser::new(CannedBackend::new(
            r#"{"action":"call_tool","tool":"remote_echo","args":{"msg":"hola"}}"#,
        ));
        let history = ConversationHistory::new();
        let intent = parser.parse_intent(&history, "haz un echo").await.unwrap();
        assert_eq!(
            intent,
            Intent::CallTool {
                tool: "remote_echo".to_string(),
                args: json!({"msg": "hola"}),
            }
        );
    }

    #[tokio::test]
    async fn test_parse_intent_prose_degrades_to_respond() {
        let parser = IntentParser::new(CannedBackend::new("No structured output today."));
        let history = ConversationHistory::new();
        let intent = parser.parse_intent(&history, "hola").await.unwrap();
        assert_eq!(
            intent,
            Intent::Respond {
                text: "No structured output today.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_parse_intent_transport_error_propagates() {
        let parser = IntentParser::new(DownBackend);
        let history = ConversationHistory::new();
        let err = parser.parse_intent(&history, "hola").await.unwrap_err();
        assert!(matches!(err, InferenceError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn test_prompt_is_bounded_and_ordered() {
        let parser = IntentParser::new(CannedBackend::new(r#"{"action":"respond","text":"ok"}"#));
        let mut history = ConversationHistory::with_system("nota inicial");
        for i in 0..20 {
            history.push_user(format!("mensaje {i}"));
        }

        parser.parse_intent(&history, "último").await.unwrap();

        let seen = parser.backend.seen.lock().unwrap();
        let messages = &seen[0];

        // system + 8 windowed turns + the new user turn
        assert_eq!(messages.len(), 1 + HISTORY_WINDOW + 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("list_my_certs"));
        assert_eq!(messages[1].content, "mensaje 12");
        assert_eq!(messages.last().unwrap().content, "último");
    }

    #[tokio::test]
    async fn test_prompt_skips_blank_turns() {
        let parser = IntentParser::new(CannedBackend::new(r#"{"action":"respond","text":"ok"}"#));
        let mut history = ConversationHistory::new();
        history.push_user("   ");
        history.push_user("real");

        parser.parse_intent(&history, "siguiente").await.unwrap();

        let seen = parser.backend.seen.lock().unwrap();
        let messages = &seen[0];
        assert_eq!(messages.len(), 3); // system + "real" + new user turn
        assert_eq!(messages[1].content, "real");
    }

    #[test]
    fn test_catalog_names_appear_in_system_prompt() {
        for name in TOOL_CATALOG {
            assert!(
                ROUTER_SYSTEM.contains(name),
                "catalog tool '{name}' missing from system prompt"
            );
        }
    }
}
