//! Tool result summaries.
//!
//! Maps a normalized payload plus a tool name to one short user-facing
//! message. Formatting is per-tool with a generic compact-JSON fallback;
//! user-facing strings are Spanish, matching the deployed prototype.
//! Nothing in here can fail — missing fields fall through to defaults.

use serde_json::Value;

use super::normalize::{normalize, ToolOutput};

/// Message used when even raw-text rendering comes up empty.
const COMPLETED: &str = "Operación completada.";

/// Summarize a tool result for the user.
pub fn summarize(tool: &str, output: &ToolOutput) -> String {
    let Some(data) = normalize(output) else {
        let raw = output.raw_text();
        return if raw.trim().is_empty() {
            COMPLETED.to_string()
        } else {
            raw
        };
    };

    match tool {
        "add_cert" => add_cert(&data),
        "list_my_certs" => list_my_certs(&data),
        "upcoming_expirations" => upcoming_expirations(&data),
        "send_email" => send_email(&data),
        "fs_write" => "Archivo escrito correctamente.".to_string(),
        "git_add_commit" => "Commit realizado y repositorio actualizado.".to_string(),
        "remote_health" => "Servicio remoto operativo.".to_string(),
        "remote_echo" => remote_echo(&data),
        _ => data.to_string(),
    }
}

// ─── Per-Tool Renderers ──────────────────────────────────────────────────────

fn add_cert(data: &Value) -> String {
    let ok = matches!(data.get("status").and_then(Value::as_str), Some("ok"))
        || data.get("ok").and_then(Value::as_bool).unwrap_or(false);
    let store = data
        .get("store")
        .or_else(|| data.get("source"))
        .and_then(Value::as_str)
        .unwrap_or("desconocido");
    format!(
        "Certificación registrada ({}; backend: {store}).",
        if ok { "ok" } else { "error" }
    )
}

fn list_my_certs(data: &Value) -> String {
    let count = data.get("count").and_then(Value::as_u64).unwrap_or(0);
    if count == 0 {
        return "No encontré certificaciones para esa persona.".to_string();
    }

    let lines: Vec<String> = data
        .get("certs")
        .and_then(Value::as_array)
        .map(|certs| {
            certs
                .iter()
                .map(|c| {
                    format!(
                        "- {} · fecha {} · vence {}",
                        field(c, "certificacion"),
                        field(c, "fecha"),
                        field(c, "vence_el"),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    format!("Certificaciones:\n{}", lines.join("\n"))
}

fn upcoming_expirations(data: &Value) -> String {
    let count = data.get("count").and_then(Value::as_u64).unwrap_or(0);
    if count == 0 {
        return "No hay certificaciones que venzan en el rango indicado.".to_string();
    }

    let lines: Vec<String> = data
        .get("alerts")
        .and_then(Value::as_array)
        .map(|alerts| {
            alerts
                .iter()
                .map(|a| {
                    // The certtrack backend emits `email` for alert rows;
                    // `nombre` only appears in older payloads.
                    let who = a
                        .get("nombre")
                        .or_else(|| a.get("email"))
                        .and_then(Value::as_str)
                        .unwrap_or("desconocido");
                    format!(
                        "- {who}: {} vence el {}",
                        field(a, "certificacion"),
                        field(a, "vence_el"),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    format!("Próximos vencimientos:\n{}", lines.join("\n"))
}

fn send_email(data: &Value) -> String {
    let provider = data
        .get("provider")
        .or_else(|| data.get("mode"))
        .and_then(Value::as_str)
        .unwrap_or("desconocido");
    let ok = data.get("ok").and_then(Value::as_bool).unwrap_or(true);
    format!(
        "Correo {} (proveedor: {provider}).",
        if ok { "enviado" } else { "no enviado" }
    )
}

fn remote_echo(data: &Value) -> String {
    if let Some(echo) = data
        .get("result")
        .and_then(|r| r.get("echo"))
        .and_then(Value::as_str)
    {
        return format!("Remoto respondió: {echo}");
    }
    if let Some(echo) = data.get("echo").and_then(Value::as_str) {
        return format!("Remoto respondió: {echo}");
    }
    data.to_string()
}

/// String field accessor with an empty-string default.
fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> ToolOutput {
        ToolOutput::Structured(value)
    }

    #[test]
    fn test_list_empty_has_no_bullets() {
        let summary = summarize("list_my_certs", &structured(json!({"count": 0, "certs": []})));
        assert_eq!(summary, "No encontré certificaciones para esa persona.");
        assert!(!summary.contains("- "));
    }

    #[test]
    fn test_list_single_cert_renders_one_bullet() {
        let summary = summarize(
            "list_my_certs",
            &structured(json!({
                "count": 1,
                "certs": [{
                    "certificacion": "X",
                    "fecha": "2024-01-01",
                    "vence_el": "2025-01-01"
                }]
            })),
        );

        assert!(summary.starts_with("Certificaciones:"));
        let bullets: Vec<&str> = summary.lines().filter(|l| l.starts_with("- ")).collect();
        assert_eq!(bullets.len(), 1);
        assert!(bullets[0].contains('X'));
        assert!(bullets[0].contains("2024-01-01"));
        assert!(bullets[0].contains("2025-01-01"));
    }

    #[test]
    fn test_add_cert_ok_and_store() {
        let summary = summarize(
            "add_cert",
            &structured(json!({"status": "ok", "store": "csv-local"})),
        );
        assert!(summary.contains("ok"));
        assert!(summary.contains("csv-local"));
    }

    #[test]
    fn test_add_cert_error_status() {
        let summary = summarize(
            "add_cert",
            &structured(json!({"status": "error: id duplicado: u1"})),
        );
        assert!(summary.contains("error"));
        assert!(summary.contains("desconocido"));
    }

    #[test]
    fn test_upcoming_zero_count() {
        let summary = summarize(
            "upcoming_expirations",
            &structured(json!({"count": 0, "alerts": []})),
        );
        assert_eq!(
            summary,
            "No hay certificaciones que venzan en el rango indicado."
        );
    }

    #[test]
    fn test_upcoming_alert_falls_back_to_email() {
        let summary = summarize(
            "upcoming_expirations",
            &structured(json!({
                "count": 1,
                "alerts": [{
                    "email": "laura.lopez@example.com",
                    "certificacion": "Networking Básico",
                    "vence_el": "2026-09-01"
                }]
            })),
        );
        assert!(summary.starts_with("Próximos vencimientos:"));
        assert!(summary.contains("laura.lopez@example.com"));
        assert!(summary.contains("Networking Básico"));
        assert!(summary.contains("2026-09-01"));
    }

    #[test]
    fn test_send_email_provider() {
        let summary = summarize("send_email", &structured(json!({"ok": true, "provider": "graph"})));
        assert_eq!(summary, "Correo enviado (proveedor: graph).");

        let summary = summarize("send_email", &structured(json!({"ok": false, "mode": "mock"})));
        assert_eq!(summary, "Correo no enviado (proveedor: mock).");
    }

    #[test]
    fn test_fixed_messages() {
        let ok = structured(json!({"ok": true}));
        assert_eq!(summarize("fs_write", &ok), "Archivo escrito correctamente.");
        assert_eq!(
            summarize("git_add_commit", &ok),
            "Commit realizado y repositorio actualizado."
        );
        assert_eq!(summarize("remote_health", &ok), "Servicio remoto operativo.");
    }

    #[test]
    fn test_remote_echo_nested_result() {
        let summary = summarize(
            "remote_echo",
            &structured(json!({"result": {"echo": "hola"}})),
        );
        assert_eq!(summary, "Remoto respondió: hola");
    }

    #[test]
    fn test_remote_echo_without_echo_renders_json() {
        let summary = summarize("remote_echo", &structured(json!({"result": 7})));
        assert_eq!(summary, "{\"result\":7}");
    }

    #[test]
    fn test_unknown_tool_renders_compact_json() {
        let summary = summarize("mystery_tool", &structured(json!({"a": 1})));
        assert_eq!(summary, "{\"a\":1}");
    }

    #[test]
    fn test_unparseable_output_falls_back_to_raw_text() {
        let summary = summarize("list_my_certs", &ToolOutput::Raw("plain words".to_string()));
        assert_eq!(summary, "plain words");
    }

    #[test]
    fn test_blank_unparseable_output_reports_completion() {
        let summary = summarize("list_my_certs", &ToolOutput::Raw("   ".to_string()));
        assert_eq!(summary, COMPLETED);
    }

    #[test]
    fn test_text_block_wrapped_payload_is_normalized_first() {
        let output = ToolOutput::TextBlocks(vec![
            "{\"count\":0,\"certs\":[]}".to_string(),
        ]);
        let summary = summarize("list_my_certs", &output);
        assert_eq!(summary, "No encontré certificaciones para esa persona.");
    }
}
