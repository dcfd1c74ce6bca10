//! OpenAI-compatible inference client.
//!
//! Sends non-streaming chat completion requests to the configured endpoint
//! (Groq by default) and returns the assistant's text reply. The router
//! consumes this through the `CompletionBackend` trait so intent parsing can
//! be exercised in tests without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::config::Config;

use super::errors::InferenceError;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Placeholder used when the model returns an empty reply.
const EMPTY_REPLY: &str = "[Respuesta vacía]";

// ─── CompletionBackend ───────────────────────────────────────────────────────

/// Anything that can turn a message list into an assistant reply.
///
/// The intent parser is generic over this trait; tests plug in scripted
/// fakes, production plugs in `InferenceClient`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, InferenceError>;
}

// ─── InferenceClient ─────────────────────────────────────────────────────────

/// Client for the chat completions endpoint.
pub struct InferenceClient {
    http: HttpClient,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl InferenceClient {
    /// Build a client from the resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: config.llm_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            url: config.llm_url.clone(),
            model: config.llm_model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// The model name requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for InferenceClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, InferenceError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        // Log request metadata, never the message contents
        tracing::info!(
            url = %self.url,
            model = %body.model,
            turns = body.messages.len(),
            "llm request"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        duration_secs: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    InferenceError::ConnectionFailed {
                        endpoint: self.url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body_text, "llm error response");
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| InferenceError::InvalidResponse {
                reason: format!("failed to read response body: {e}"),
            })?;

        let text = extract_reply(&body_text)?;
        tracing::info!(status = status.as_u16(), chars = text.len(), "llm response");
        Ok(text)
    }
}

// ─── Response Parsing ────────────────────────────────────────────────────────

/// Pull the assistant text out of a chat completion response body.
///
/// An empty or missing reply becomes a fixed placeholder rather than an
/// error — the router treats the placeholder as a plain response.
fn extract_reply(body: &str) -> Result<String, InferenceError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::InvalidResponse {
            reason: format!("failed to parse chat completion: {e}"),
        })?;

    let text = parsed
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .unwrap_or("")
        .trim()
        .to_string();

    if text.is_empty() {
        Ok(EMPTY_REPLY.to_string())
    } else {
        Ok(text)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_basic() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  hola  "}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "hola");
    }

    #[test]
    fn test_extract_reply_empty_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), EMPTY_REPLY);
    }

    #[test]
    fn test_extract_reply_missing_choices() {
        let body = r#"{}"#;
        assert_eq!(extract_reply(body).unwrap(), EMPTY_REPLY);
    }

    #[test]
    fn test_extract_reply_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), EMPTY_REPLY);
    }

    #[test]
    fn test_extract_reply_invalid_json() {
        let err = extract_reply("not json").unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = Config::for_tests();
        let client = InferenceClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemma2-9b-it");
    }
}
