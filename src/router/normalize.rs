//! Tool result normalization.
//!
//! Backends return three shapes: structured JSON, MCP-style text-block
//! containers, and plain strings. The shape is classified exactly once at
//! the backend boundary into [`ToolOutput`]; everything downstream
//! pattern-matches instead of probing.

use serde_json::Value;

use super::extract::extract_json;

// ─── ToolOutput ──────────────────────────────────────────────────────────────

/// A tool result, classified at the backend boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Already-structured JSON payload.
    Structured(Value),
    /// An ordered sequence of text blocks (MCP `content` shape).
    TextBlocks(Vec<String>),
    /// Anything else, kept as text.
    Raw(String),
}

impl ToolOutput {
    /// Classify a backend payload.
    ///
    /// An object shaped like `{"content": [{"type":"text","text":…}, …]}`
    /// becomes `TextBlocks`; a bare string becomes `Raw`; every other value
    /// stays `Structured`.
    pub fn from_value(value: Value) -> Self {
        if let Some(blocks) = text_blocks(&value) {
            return ToolOutput::TextBlocks(blocks);
        }
        match value {
            Value::String(s) => ToolOutput::Raw(s),
            other => ToolOutput::Structured(other),
        }
    }

    /// Best-effort text rendering, used when normalization fails.
    pub fn raw_text(&self) -> String {
        match self {
            ToolOutput::Structured(value) => value.to_string(),
            ToolOutput::TextBlocks(blocks) => blocks.join("\n"),
            ToolOutput::Raw(text) => text.clone(),
        }
    }
}

/// Match the MCP text-block container shape and collect the block texts.
fn text_blocks(value: &Value) -> Option<Vec<String>> {
    let content = value.get("content")?.as_array()?;
    let blocks: Vec<String> = content
        .iter()
        .filter_map(|item| {
            if item.get("type")?.as_str()? != "text" {
                return None;
            }
            Some(item.get("text")?.as_str()?.to_string())
        })
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks)
    }
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Reduce a tool output to a structured payload, if one can be found.
///
/// `Structured` values pass through unchanged, so the function is idempotent.
/// `None` means "render the raw text" — it is never an error.
pub fn normalize(output: &ToolOutput) -> Option<Value> {
    match output {
        ToolOutput::Structured(value) => Some(value.clone()),
        ToolOutput::TextBlocks(blocks) => blocks.iter().find_map(|block| extract_json(block)),
        ToolOutput::Raw(text) => extract_json(text),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
