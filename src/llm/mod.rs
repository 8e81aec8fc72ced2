//! LLM: two-provider adapter behind one `send` contract.
//!
//! DESIGN
//! ======
//! `LlmClient` owns one client per provider and dispatches on the
//! [`AiProvider`] variant carried by each request's [`ProviderConfig`]. The
//! selected provider is caller-owned state; the client itself is stateless
//! and shared across cases. A new backend is a new variant plus one match arm
//! here; services never branch on the provider.
//!
//! Missing keys are rejected before any network traffic. Backend error
//! bodies are logged here and never returned to callers.

pub mod config;
pub mod huggingface;
pub mod openai;
pub mod types;

#[cfg(test)]
pub(crate) mod test_backend;

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use config::{AiProvider, LlmConfig, LlmTimeouts, ProviderConfig};
pub use types::LlmChat;
use types::{AiMessage, AiReply, AiRequest, LlmError, RequestKind};

/// Longest slice of a backend error body written to the log.
const LOGGED_BODY_LIMIT: usize = 512;

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client covering every supported provider.
pub struct LlmClient {
    openai: openai::OpenAiClient,
    huggingface: huggingface::HuggingFaceClient,
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = build_http(config.timeouts)?;
        Ok(Self {
            openai: openai::OpenAiClient::new(
                http.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
                config.max_tokens,
            ),
            huggingface: huggingface::HuggingFaceClient::new(
                http,
                config.huggingface_base_url.clone(),
                config.huggingface_model.clone(),
                config.huggingface_max_new_tokens,
            ),
        })
    }

    /// Model name used for `provider`.
    #[must_use]
    pub fn model(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::OpenAi => self.openai.model(),
            AiProvider::HuggingFace => self.huggingface.model(),
        }
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn send(
        &self,
        messages: &[AiMessage],
        system_prompt: &str,
        config: &ProviderConfig,
        kind: RequestKind,
    ) -> Result<AiReply, LlmError> {
        let provider = config.provider;
        if config.api_key.trim().is_empty() {
            warn!(%provider, "llm: provider not configured");
            return Err(LlmError::NotConfigured { provider });
        }

        let request = AiRequest::new(system_prompt, messages);
        info!(%provider, turns = request.turns().len(), ?kind, "llm: dispatching request");

        let result = match provider {
            AiProvider::OpenAi => self.openai.send(&config.api_key, &request, kind).await,
            AiProvider::HuggingFace => {
                self.huggingface
                    .send(&config.api_key, &request, kind)
                    .await
            }
        };

        match &result {
            Ok(reply) => info!(%provider, reply_len = reply.text.len(), "llm: reply received"),
            Err(LlmError::MalformedResponse { detail, .. }) => {
                warn!(%provider, %detail, "llm: malformed response payload");
            }
            Err(e) => warn!(%provider, error = %e, "llm: request failed"),
        }
        result
    }
}

// =============================================================================
// HTTP PLUMBING
// =============================================================================

fn build_http(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// POST `body` as JSON with bearer auth and return the raw 2xx response text.
pub(crate) async fn post_json(
    http: &reqwest::Client,
    provider: AiProvider,
    url: &str,
    api_key: &str,
    body: &impl Serialize,
) -> Result<String, LlmError> {
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| {
            warn!(%provider, error = %e, "llm: transport error");
            LlmError::TransportFailure { provider, status: None }
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        warn!(%provider, error = %e, "llm: failed to read response body");
        LlmError::TransportFailure { provider, status: Some(status.as_u16()) }
    })?;

    if !status.is_success() {
        warn!(
            %provider,
            status = status.as_u16(),
            body = %truncate_for_log(&text),
            "llm: backend returned error status"
        );
        return Err(LlmError::TransportFailure { provider, status: Some(status.as_u16()) });
    }

    Ok(text)
}

fn truncate_for_log(text: &str) -> &str {
    if text.len() <= LOGGED_BODY_LIMIT {
        return text;
    }
    let mut end = LOGGED_BODY_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
