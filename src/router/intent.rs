//! Router intents.
//!
//! The model is asked for a single JSON object with an `action` tag:
//! `respond`, `call_tool`, or `batch`. No other tags are recognized.
//! Interpretation is deliberately forgiving — anything that does not match
//! one of the three shapes degrades to `Respond`, never to an error.

use serde_json::{Map, Value};

use super::extract::extract_json;

/// Acknowledgment used when a respond-shaped reply carries no text.
const RESPOND_FALLBACK: &str = "Ok.";

/// Acknowledgment used when the tag is unrecognized and no text is present.
const GENERIC_ACK: &str = "Entendido.";

// ─── Intent ──────────────────────────────────────────────────────────────────

/// One step of a batch: a tool name plus its argument map.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolAction {
    pub tool: String,
    pub args: Value,
}

/// What the router decided to do with a user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Answer directly with text, no tool involved.
    Respond { text: String },
    /// Invoke a single tool.
    CallTool { tool: String, args: Value },
    /// Invoke several tools, strictly in the listed order.
    Batch { actions: Vec<ToolAction> },
}

impl Intent {
    /// Coerce raw model text into an intent.
    ///
    /// Extraction failures and non-object values degrade to `Respond` with
    /// the trimmed raw text; the failure is logged for offline diagnosis.
    pub fn from_model_text(raw: &str) -> Intent {
        match extract_json(raw) {
            Some(Value::Object(map)) => Self::from_object(&map),
            _ => {
                tracing::error!(raw = %truncate(raw, 500), "router parse failure");
                let text = raw.trim();
                Intent::Respond {
                    text: if text.is_empty() {
                        "No tengo una respuesta en este momento.".to_string()
                    } else {
                        text.to_string()
                    },
                }
            }
        }
    }

    /// Interpret a parsed JSON object according to its `action` tag.
    fn from_object(map: &Map<String, Value>) -> Intent {
        match map.get("action").and_then(Value::as_str) {
            Some("call_tool") => {
                if let Some(tool) = map.get("tool").and_then(Value::as_str) {
                    return Intent::CallTool {
                        tool: tool.to_string(),
                        args: arg_map(map.get("args")),
                    };
                }
                Self::respond_fallback(map, GENERIC_ACK)
            }
            Some("batch") => {
                if let Some(actions) = map.get("actions").and_then(Value::as_array) {
                    if let Some(actions) = parse_actions(actions) {
                        return Intent::Batch { actions };
                    }
                }
                Self::respond_fallback(map, GENERIC_ACK)
            }
            Some("respond") => Self::respond_fallback(map, RESPOND_FALLBACK),
            _ => Self::respond_fallback(map, GENERIC_ACK),
        }
    }

    /// Respond with the object's `text` field, or a default acknowledgment.
    fn respond_fallback(map: &Map<String, Value>, default: &str) -> Intent {
        let text = map
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(default);
        Intent::Respond {
            text: text.to_string(),
        }
    }
}

/// Interpret a list of `{tool, args}` entries.
///
/// Every entry must carry a string `tool`; otherwise the whole list is
/// rejected and the caller falls back to a plain response.
fn parse_actions(entries: &[Value]) -> Option<Vec<ToolAction>> {
    entries
        .iter()
        .map(|entry| {
            let tool = entry.get("tool")?.as_str()?;
            Some(ToolAction {
                tool: tool.to_string(),
                args: arg_map(entry.get("args")),
            })
        })
        .collect()
}

/// Normalize an optional `args` field into an object, defaulting to `{}`.
fn arg_map(args: Option<&Value>) -> Value {
    match args {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    }
}

/// Truncate a string on a char boundary, for log previews.
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_respond_shape() {
        let intent = Intent::from_model_text(r#"{"action":"respond","text":"hi"}"#);
        assert_eq!(
            intent,
            Intent::Respond {
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_call_tool_round_trip() {
        let intent = Intent::from_model_text(
            r#"{"action":"call_tool","tool":"list_my_certs","args":{"nombre":"Laura López"}}"#,
        );
        assert_eq!(
            intent,
            Intent::CallTool {
                tool: "list_my_certs".to_string(),
                args: json!({"nombre": "Laura López"}),
            }
        );
    }

    #[test]
    fn test_call_tool_fenced_with_language_tag() {
        let raw = "```json\n{\"action\":\"call_tool\",\"tool\":\"upcoming_expirations\",\"args\":{\"days_before\":45}}\n```";
        let intent = Intent::from_model_text(raw);
        assert_eq!(
            intent,
            Intent::CallTool {
                tool: "upcoming_expirations".to_string(),
                args: json!({"days_before": 45}),
            }
        );
    }

    #[test]
    fn test_call_tool_missing_args_defaults_to_empty_map() {
        let intent = Intent::from_model_text(r#"{"action":"call_tool","tool":"remote_health"}"#);
        assert_eq!(
            intent,
            Intent::CallTool {
                tool: "remote_health".to_string(),
                args: json!({}),
            }
        );
    }

    #[test]
    fn test_call_tool_without_tool_name_degrades() {
        let intent = Intent::from_model_text(r#"{"action":"call_tool","args":{}}"#);
        assert!(matches!(intent, Intent::Respond { .. }));
    }

    #[test]
    fn test_batch_preserves_order() {
        let raw = r#"{"action":"batch","actions":[
            {"tool":"fs_write","args":{"path":"a.txt","content":"x"}},
            {"tool":"git_add_commit","args":{"files":["a.txt"]}}
        ]}"#;
        let intent = Intent::from_model_text(raw);
        match intent {
            Intent::Batch { actions } => {
                assert_eq!(actions.len(), 2);
                assert_eq!(actions[0].tool, "fs_write");
                assert_eq!(actions[1].tool, "git_add_commit");
            }
            other => panic!("expected Batch, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_with_nameless_entry_degrades() {
        let raw = r#"{"action":"batch","actions":[{"args":{}}],"text":"lo intento"}"#;
        let intent = Intent::from_model_text(raw);
        assert_eq!(
            intent,
            Intent::Respond {
                text: "lo intento".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_tag_uses_text_field() {
        let intent = Intent::from_model_text(r#"{"action":"think","text":"hmm"}"#);
        assert_eq!(
            intent,
            Intent::Respond {
                text: "hmm".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_tag_without_text_uses_generic_ack() {
        let intent = Intent::from_model_text(r#"{"action":"think"}"#);
        assert_eq!(
            intent,
            Intent::Respond {
                text: GENERIC_ACK.to_string()
            }
        );
    }

    #[test]
    fn test_respond_without_text_uses_ok() {
        let intent = Intent::from_model_text(r#"{"action":"respond"}"#);
        assert_eq!(
            intent,
            Intent::Respond {
                text: RESPOND_FALLBACK.to_string()
            }
        );
    }

    #[test]
    fn test_plain_prose_degrades_to_respond_verbatim() {
        let intent = Intent::from_model_text("  I cannot find that tool, sorry.  ");
        assert_eq!(
            intent,
            Intent::Respond {
                text: "I cannot find that tool, sorry.".to_string()
            }
        );
    }

    #[test]
    fn test_non_object_json_degrades_to_respond() {
        let intent = Intent::from_model_text("[1,2,3]");
        assert_eq!(
            intent,
            Intent::Respond {
                text: "[1,2,3]".to_string()
            }
        );
    }

    #[test]
    fn test_empty_input_has_placeholder_text() {
        let intent = Intent::from_model_text("   ");
        match intent {
            Intent::Respond { text } => assert!(!text.is_empty()),
            other => panic!("expected Respond, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_inputs_never_panic() {
        // A small corpus of hostile shapes — all must coerce to some intent
        for raw in [
            "{",
            "}{",
            "```",
            "``````",
            r#"{"action": 42}"#,
            r#"{"action":"batch","actions":"nope"}"#,
            r#"{"action":"call_tool","tool":7}"#,
            r#"{"tool":"x","args":{}}"#,
            "null",
            "true",
        ] {
            let _ = Intent::from_model_text(raw);
        }
    }
}
