//! LLM types: provider-neutral messages, replies, and errors.
//!
//! Shared by the chat-completions and text-inference clients. Services only
//! ever see these types; wire formats stay private to each client module.

use serde::{Deserialize, Serialize};

use super::config::{AiProvider, ProviderConfig};

const CONVERSATION_TEMPERATURE: f64 = 0.7;
const ANALYSIS_TEMPERATURE: f64 = 0.3;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
///
/// `TransportFailure` and `MalformedResponse` render the same user-facing
/// message; backend bodies are logged where they occur and never carried here.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The selected provider has no API key.
    #[error("{} is not configured: provide an API key", .provider.label())]
    NotConfigured { provider: AiProvider },

    /// Network failure or non-success HTTP status from the backend.
    #[error("AI request failed, please try again")]
    TransportFailure { provider: AiProvider, status: Option<u16> },

    /// The backend answered 2xx with a payload we could not read.
    #[error("AI request failed, please try again")]
    MalformedResponse { provider: AiProvider, detail: String },

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "E_NOT_CONFIGURED",
            Self::TransportFailure { .. } => "E_TRANSPORT_FAILURE",
            Self::MalformedResponse { .. } => "E_MALFORMED_RESPONSE",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::TransportFailure { .. } | Self::MalformedResponse { .. })
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiRole {
    System,
    User,
    Assistant,
}

impl AiRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single turn in the wire-neutral request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMessage {
    pub role: AiRole,
    pub content: String,
}

impl AiMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: AiRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: AiRole::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: AiRole::System, content: content.into() }
    }
}

/// The full request handed to a backend: exactly one system entry, first,
/// followed by the conversation turns in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    entries: Vec<AiMessage>,
}

impl AiRequest {
    /// Stray system-role turns in `turns` are dropped so the system prompt
    /// stays the only system entry.
    #[must_use]
    pub fn new(system_prompt: &str, turns: &[AiMessage]) -> Self {
        let mut entries = Vec::with_capacity(turns.len() + 1);
        entries.push(AiMessage::system(system_prompt));
        entries.extend(
            turns
                .iter()
                .filter(|turn| turn.role != AiRole::System)
                .cloned(),
        );
        Self { entries }
    }

    /// System entry followed by every turn.
    #[must_use]
    pub fn entries(&self) -> &[AiMessage] {
        &self.entries
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.entries[0].content
    }

    /// Conversation turns without the system entry.
    #[must_use]
    pub fn turns(&self) -> &[AiMessage] {
        &self.entries[1..]
    }
}

/// Which kind of call this is. Drives sampling temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Open-ended dialogue with the case assistant.
    Conversation,
    /// One-shot extractive summary of uploaded documents.
    DocumentAnalysis,
}

impl RequestKind {
    #[must_use]
    pub fn temperature(self) -> f64 {
        match self {
            Self::Conversation => CONVERSATION_TEMPERATURE,
            Self::DocumentAnalysis => ANALYSIS_TEMPERATURE,
        }
    }
}

/// Generated text from a successful call, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiReply {
    pub text: String,
}

/// Canonical response object handed to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiResponse {
    /// Failure shape: empty `message`, text in `error`.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self { message: String::new(), error: Some(error.into()) }
    }
}

impl From<Result<AiReply, LlmError>> for AiResponse {
    fn from(result: Result<AiReply, LlmError>) -> Self {
        match result {
            Ok(reply) => Self { message: reply.text, error: None },
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for one LLM call. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send `messages` with `system_prompt` to the backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] before any network traffic when the
    /// key is blank, otherwise a transport or payload error from the backend.
    async fn send(
        &self,
        messages: &[AiMessage],
        system_prompt: &str,
        config: &ProviderConfig,
        kind: RequestKind,
    ) -> Result<AiReply, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
