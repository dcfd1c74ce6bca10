//! Best-effort JSON extraction from model and tool text.
//!
//! Models wrap JSON in prose or code fences; tool servers embed JSON inside
//! text blocks. Both the intent parser and the result normalizer funnel
//! through `extract_json`, a pure function that can be fuzzed without any
//! backend in the loop.
//!
//! Extraction order, each step attempted only if the previous fails:
//! 1. Strip a leading/trailing code fence (optional language tag).
//! 2. Parse the substring between the first `{` and the last `}`.
//! 3. Parse the whole stripped text.

use serde_json::Value;

/// Remove a fenced-code wrapper if the trimmed text starts and ends with one.
///
/// The opening fence may carry a language tag (```` ```json ````); the tag is
/// discarded along with the rest of its line. Text without a leading fence is
/// returned trimmed but otherwise untouched.
pub fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };

    // Drop the optional language tag: everything up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Extract the first parseable JSON value from free-form text.
///
/// Returns `None` when nothing parses; callers decide what degradation
/// means (raw-text respond for intents, raw rendering for tool results).
pub fn extract_json(s: &str) -> Option<Value> {
    let s = strip_code_fences(s);

    if let (Some(first), Some(last)) = (s.find('{'), s.rfind('}')) {
        if last > first {
            if let Ok(value) = serde_json::from_str(&s[first..=last]) {
                return Some(value);
            }
        }
    }

    serde_json::from_str(s).ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ─── Fence stripping ─────────────────────────────────────────────────

    #[test]
    fn test_strip_fences_with_language_tag() {
        let wrapped = "```json\n{\"action\":\"respond\"}\n```";
        assert_eq!(strip_code_fences(wrapped), "{\"action\":\"respond\"}");
    }

    #[test]
    fn test_strip_fences_without_language_tag() {
        let wrapped = "```\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(wrapped), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  hola mundo  "), "hola mundo");
    }

    #[test]
    fn test_strip_fences_unterminated() {
        // Opening fence but no closing one — the body still comes back
        let wrapped = "```json\n{\"a\":1}";
        assert_eq!(strip_code_fences(wrapped), "{\"a\":1}");
    }

    // ─── JSON extraction ─────────────────────────────────────────────────

    #[test]
    fn test_extract_bare_object() {
        let value = extract_json(r#"{"action":"respond","text":"hi"}"#).unwrap();
        assert_eq!(value["action"], "respond");
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let text = r#"Sure! Here is the plan: {"action":"call_tool","tool":"remote_health","args":{}} hope that helps"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["tool"], "remote_health");
    }

    #[test]
    fn test_extract_fenced_with_tag() {
        let text = "```json\n{\"action\":\"call_tool\",\"tool\":\"upcoming_expirations\",\"args\":{\"days_before\":45}}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["args"]["days_before"], 45);
    }

    #[test]
    fn test_extract_nested_braces() {
        let text = r#"{"action":"call_tool","tool":"add_cert","args":{"row":{"id":"u9","nombre":"Ana"}}}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["args"]["row"]["nombre"], "Ana");
    }

    #[test]
    fn test_extract_plain_text_is_none() {
        assert!(extract_json("no structured data here").is_none());
    }

    #[test]
    fn test_extract_unbalanced_braces_is_none() {
        assert!(extract_json("{\"action\": \"respond\"").is_none());
    }

    #[test]
    fn test_extract_braces_with_garbage_inside_is_none() {
        assert!(extract_json("look { this is not json } really").is_none());
    }

    #[test]
    fn test_extract_whole_text_fallback_parses_array() {
        // No '{' to scan for, so the whole-text fallback gets a shot
        let value = extract_json("[1, 2, 3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_extract_empty_input_is_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("   \n  ").is_none());
    }

    #[test]
    fn test_extract_trailing_prose_after_fences() {
        let text = "```json\n{\"action\":\"respond\",\"text\":\"ok\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["text"], "ok");
    }
}
