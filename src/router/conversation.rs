//! Conversation history.
//!
//! Turns are append-only and exclusively owned by the session loop. Only a
//! bounded trailing window is ever forwarded to the intent parser, which
//! keeps the prompt size independent of session length.

use serde::{Deserialize, Serialize};

use crate::inference::types::Role;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Number of trailing turns forwarded to the intent parser.
pub const HISTORY_WINDOW: usize = 8;

// ─── Turns ───────────────────────────────────────────────────────────────────

/// One block of turn content. Only text blocks exist today; the tagged shape
/// matches the wire format the backends speak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// A single conversation turn: a role plus an ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ConversationTurn {
    /// Build a turn holding a single text block.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Concatenate the turn's text blocks into one string.
    pub fn flatten(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect()
    }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Append-only conversation history.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Start an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a history seeded with a system note.
    pub fn with_system(note: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.push(ConversationTurn::text(Role::System, note));
        history
    }

    /// Append a turn. Turns are never mutated or removed afterwards.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Append a user turn holding a single text block.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(ConversationTurn::text(Role::User, text));
    }

    /// Append an assistant turn holding a single text block.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(ConversationTurn::text(Role::Assistant, text));
    }

    /// The `n` most recent turns, in order.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// All turns, in order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of stored turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_joins_blocks_in_order() {
        let turn = ConversationTurn {
            role: Role::User,
            content: vec![
                ContentBlock::Text {
                    text: "hola ".into(),
                },
                ContentBlock::Text {
                    text: "mundo".into(),
                },
            ],
        };
        assert_eq!(turn.flatten(), "hola mundo");
    }

    #[test]
    fn test_history_is_append_only() {
        let mut history = ConversationHistory::new();
        history.push_user("uno");
        history.push_assistant("dos");
        history.push_user("tres");

        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[0].flatten(), "uno");
        assert_eq!(history.turns()[2].flatten(), "tres");
    }

    #[test]
    fn test_recent_returns_trailing_window() {
        let mut history = ConversationHistory::new();
        for i in 0..12 {
            history.push_user(format!("turno {i}"));
        }

        let window = history.recent(HISTORY_WINDOW);
        assert_eq!(window.len(), HISTORY_WINDOW);
        assert_eq!(window[0].flatten(), "turno 4");
        assert_eq!(window[7].flatten(), "turno 11");
    }

    #[test]
    fn test_recent_smaller_history_returns_all() {
        let mut history = ConversationHistory::new();
        history.push_user("solo");
        assert_eq!(history.recent(HISTORY_WINDOW).len(), 1);
    }

    #[test]
    fn test_with_system_seeds_first_turn() {
        let history = ConversationHistory::with_system("nota");
        assert_eq!(history.len(), 1);
        assert_eq!(history.turns()[0].role, Role::System);
    }

    #[test]
    fn test_content_block_wire_shape() {
        let block = ContentBlock::Text {
            text: "hola".into(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hola"}"#);
    }
}
