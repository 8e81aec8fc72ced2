//! Text-inference client (Provider B).
//!
//! The backend takes one string, so the request is flattened into role-tagged
//! lines: `<system>…</system>` first, then `<role>content</role>` per turn in
//! order. Lossy (no structure survives) but order-preserving.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use super::config::AiProvider;
use super::types::{AiReply, AiRequest, LlmError, RequestKind};

const PROVIDER: AiProvider = AiProvider::HuggingFace;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HuggingFaceClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_new_tokens: u32,
}

impl HuggingFaceClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: String, model: String, max_new_tokens: u32) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { http, base_url, model, max_new_tokens }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// # Errors
    ///
    /// Returns a transport error for non-2xx responses and a malformed-response
    /// error when the body is not a `[{"generated_text": …}]` array.
    pub async fn send(&self, api_key: &str, request: &AiRequest, kind: RequestKind) -> Result<AiReply, LlmError> {
        let inputs = flatten_prompt(request);
        let body = InferenceRequest {
            inputs: &inputs,
            parameters: InferenceParameters {
                temperature: kind.temperature(),
                max_new_tokens: self.max_new_tokens,
                return_full_text: false,
            },
        };
        let url = format!("{}/{}", self.base_url, self.model);
        let text = super::post_json(&self.http, PROVIDER, &url, api_key, &body).await?;
        parse_inference_response(&text)
    }
}

// =============================================================================
// PROMPT FLATTENING
// =============================================================================

pub(crate) fn flatten_prompt(request: &AiRequest) -> String {
    let mut out = format!("<system>{}</system>", request.system_prompt());
    for turn in request.turns() {
        let role = turn.role.as_str();
        let _ = write!(out, "\n<{role}>{}</{role}>", turn.content);
    }
    out
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    temperature: f64,
    max_new_tokens: u32,
    return_full_text: bool,
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn malformed(detail: impl Into<String>) -> LlmError {
    LlmError::MalformedResponse { provider: PROVIDER, detail: detail.into() }
}

pub(crate) fn parse_inference_response(json_text: &str) -> Result<AiReply, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| malformed(e.to_string()))?;

    if let Some(err) = root.get("error").and_then(Value::as_str) {
        return Err(malformed(format!("inference: backend error payload: {err}")));
    }

    let Some(first) = root.as_array().and_then(|arr| arr.first()) else {
        return Err(malformed("inference: expected a non-empty array"));
    };
    let Some(text) = first.get("generated_text").and_then(Value::as_str) else {
        return Err(malformed("inference: missing [0].generated_text"));
    };

    Ok(AiReply { text: text.trim().to_string() })
}

#[cfg(test)]
#[path = "huggingface_test.rs"]
mod tests;
