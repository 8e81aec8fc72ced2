//! LLM configuration parsed from environment variables.

use serde::{Deserialize, Serialize};

use super::types::LlmError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.1";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_HUGGINGFACE_MAX_NEW_TOKENS: u32 = 1024;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// PROVIDER
// =============================================================================

/// The AI backend a case talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Chat-completions backend with native multi-turn structure.
    OpenAi,
    /// Text-inference backend that takes a single flattened prompt.
    HuggingFace,
}

impl AiProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::HuggingFace => "huggingface",
        }
    }

    /// Human-facing name shown by the provider switch.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI (Premium)",
            Self::HuggingFace => "HuggingFace (Free)",
        }
    }

    /// Parse a provider tag, e.g. from `AI_DEFAULT_PROVIDER`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for unknown names.
    pub fn parse(raw: &str) -> Result<Self, LlmError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "huggingface" => Ok(Self::HuggingFace),
            other => Err(LlmError::ConfigParse(format!("unknown AI provider: {other}"))),
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// One API key per provider, supplied by the host. Blank keys count as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub huggingface: Option<String>,
}

impl ProviderKeys {
    /// Read `OPENAI_API_KEY` and `HUGGINGFACE_API_KEY`. Missing keys are not an
    /// error here; the adapter reports `NotConfigured` when one is needed.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            openai: non_blank(std::env::var("OPENAI_API_KEY").ok()),
            huggingface: non_blank(std::env::var("HUGGINGFACE_API_KEY").ok()),
        }
    }

    #[must_use]
    pub fn get(&self, provider: AiProvider) -> Option<&str> {
        let key = match provider {
            AiProvider::OpenAi => self.openai.as_deref(),
            AiProvider::HuggingFace => self.huggingface.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Build the per-request config for `provider`. The key is empty when the
    /// provider has none configured.
    #[must_use]
    pub fn config_for(&self, provider: AiProvider) -> ProviderConfig {
        ProviderConfig { provider, api_key: self.get(provider).unwrap_or_default().to_string() }
    }
}

// Keys never show up in logs.
impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderKeys")
            .field("openai", &self.openai.is_some())
            .field("huggingface", &self.huggingface.is_some())
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Provider selection plus its key. A pure input to each adapter call.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: AiProvider,
    pub api_key: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

// =============================================================================
// CLIENT CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub default_provider: AiProvider,
    pub openai_model: String,
    pub openai_base_url: String,
    pub huggingface_model: String,
    pub huggingface_base_url: String,
    pub max_tokens: u32,
    pub huggingface_max_new_tokens: u32,
    pub timeouts: LlmTimeouts,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: AiProvider::OpenAi,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            huggingface_model: DEFAULT_HUGGINGFACE_MODEL.to_string(),
            huggingface_base_url: DEFAULT_HUGGINGFACE_BASE_URL.to_string(),
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            huggingface_max_new_tokens: DEFAULT_HUGGINGFACE_MAX_NEW_TOKENS,
            timeouts: LlmTimeouts {
                request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl LlmConfig {
    /// Build typed LLM config from environment variables. Every variable is
    /// optional:
    ///
    /// - `AI_DEFAULT_PROVIDER`: `openai` (default) or `huggingface`
    /// - `OPENAI_MODEL`, `OPENAI_BASE_URL`
    /// - `HUGGINGFACE_MODEL`, `HUGGINGFACE_BASE_URL`
    /// - `LLM_MAX_TOKENS`: default 2000
    /// - `HUGGINGFACE_MAX_NEW_TOKENS`: default 1024
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] if `AI_DEFAULT_PROVIDER` is unknown.
    pub fn from_env() -> Result<Self, LlmError> {
        let default_provider = match std::env::var("AI_DEFAULT_PROVIDER").ok() {
            Some(raw) if !raw.trim().is_empty() => AiProvider::parse(&raw)?,
            _ => AiProvider::OpenAi,
        };

        Ok(Self {
            default_provider,
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: base_url_from_env("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            huggingface_model: std::env::var("HUGGINGFACE_MODEL")
                .unwrap_or_else(|_| DEFAULT_HUGGINGFACE_MODEL.to_string()),
            huggingface_base_url: base_url_from_env("HUGGINGFACE_BASE_URL", DEFAULT_HUGGINGFACE_BASE_URL),
            max_tokens: env_parse("LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS),
            huggingface_max_new_tokens: env_parse("HUGGINGFACE_MAX_NEW_TOKENS", DEFAULT_HUGGINGFACE_MAX_NEW_TOKENS),
            timeouts: LlmTimeouts {
                request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

fn base_url_from_env(key: &str, default: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
