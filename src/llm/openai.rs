//! Chat-completions client (Provider A).
//!
//! Submits the system entry plus every turn as a structured message list to
//! `/chat/completions`. Pure parsing in `parse_chat_completions_response`
//! for testability.

use serde::Serialize;
use serde_json::Value;

use super::config::AiProvider;
use super::types::{AiMessage, AiReply, AiRequest, LlmError, RequestKind};

const PROVIDER: AiProvider = AiProvider::OpenAi;

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: String, model: String, max_tokens: u32) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { http, base_url, model, max_tokens }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// # Errors
    ///
    /// Returns a transport error for non-2xx responses and a malformed-response
    /// error when `choices[0].message.content` is missing.
    pub async fn send(&self, api_key: &str, request: &AiRequest, kind: RequestKind) -> Result<AiReply, LlmError> {
        let body = CcRequest {
            model: &self.model,
            messages: request.entries(),
            temperature: kind.temperature(),
            max_tokens: self.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let text = super::post_json(&self.http, PROVIDER, &url, api_key, &body).await?;
        parse_chat_completions_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    messages: &'a [AiMessage],
    temperature: f64,
    max_tokens: u32,
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn malformed(detail: impl Into<String>) -> LlmError {
    LlmError::MalformedResponse { provider: PROVIDER, detail: detail.into() }
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<AiReply, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| malformed(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(malformed("chat_completions: missing choices[0]"));
    };

    let Some(content) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    else {
        return Err(malformed("chat_completions: missing choices[0].message.content"));
    };

    Ok(AiReply { text: content.trim().to_string() })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
