//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the explicitly constructed [`Session`] (provider keys and default
//! provider), the LLM adapter, and a map of live case states. Each case owns
//! its transcript, system prompt, provider selection, and conversation phase;
//! nothing mutable is shared across cases.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::llm::LlmChat;
use crate::llm::config::{AiProvider, ProviderConfig, ProviderKeys};

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Uploaded file handle. Only name and size reach the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// One transcript entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub case_id: Uuid,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileRef>,
}

impl Message {
    #[must_use]
    pub fn new(case_id: Uuid, sender: Sender, content: String, attachments: Vec<FileRef>) -> Self {
        Self { id: Uuid::new_v4(), content, sender, timestamp: now_ms(), case_id, attachments }
    }
}

// =============================================================================
// CASE
// =============================================================================

/// A unit of work owning its own conversation and system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    Idle,
    AwaitingResponse,
}

/// Per-case live state: the case entity plus conversation runtime state.
#[derive(Debug, Clone)]
pub struct CaseState {
    pub case: Case,
    pub phase: ConversationPhase,
    /// Provider used by the next `send`. Not part of the case entity.
    pub provider: AiProvider,
}

impl CaseState {
    #[must_use]
    pub fn new(id: Uuid, system_prompt: String, provider: AiProvider) -> Self {
        Self {
            case: Case { id, system_prompt, messages: Vec::new() },
            phase: ConversationPhase::Idle,
            provider,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CaseSnapshot {
        CaseSnapshot {
            id: self.case.id,
            system_prompt: self.case.system_prompt.clone(),
            messages: self.case.messages.clone(),
            provider: self.provider,
            phase: self.phase,
        }
    }
}

/// Read model handed back to the dashboard for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub id: Uuid,
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub provider: AiProvider,
    pub phase: ConversationPhase,
}

// =============================================================================
// SESSION
// =============================================================================

/// Host-owned session context: which keys exist and which provider new cases
/// start on. Built once by the binary and threaded into `AppState`.
#[derive(Debug, Clone)]
pub struct Session {
    pub keys: ProviderKeys,
    pub default_provider: AiProvider,
}

impl Session {
    #[must_use]
    pub fn new(keys: ProviderKeys, default_provider: AiProvider) -> Self {
        Self { keys, default_provider }
    }

    #[must_use]
    pub fn provider_config(&self, provider: AiProvider) -> ProviderConfig {
        self.keys.config_for(provider)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub llm: Arc<dyn LlmChat>,
    pub cases: Arc<RwLock<HashMap<Uuid, CaseState>>>,
}

impl AppState {
    #[must_use]
    pub fn new(session: Session, llm: Arc<dyn LlmChat>) -> Self {
        Self { session: Arc::new(session), llm, cases: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::sync::Notify;

    use super::*;
    use crate::llm::types::{AiMessage, AiReply, LlmError, RequestKind};

    /// One call observed by [`MockLlm`].
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub messages: Vec<AiMessage>,
        pub system_prompt: String,
        pub config: ProviderConfig,
        pub kind: RequestKind,
    }

    /// Scripted LLM. Replies are consumed in order; once exhausted it answers
    /// `"done"`. With a gate, every call waits for `release()` first.
    pub struct MockLlm {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: Mutex<Vec<RecordedCall>>,
        gate: Option<Notify>,
    }

    impl MockLlm {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), calls: Mutex::new(Vec::new()), gate: None }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn gated(replies: Vec<Result<String, LlmError>>) -> Self {
            Self { gate: Some(Notify::new()), ..Self::new(replies) }
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmChat for MockLlm {
        async fn send(
            &self,
            messages: &[AiMessage],
            system_prompt: &str,
            config: &ProviderConfig,
            kind: RequestKind,
        ) -> Result<AiReply, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                messages: messages.to_vec(),
                system_prompt: system_prompt.to_string(),
                config: config.clone(),
                kind,
            });
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let next = self.replies.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok("done".into()))
                .map(|text| AiReply { text })
        }
    }

    #[must_use]
    pub fn test_keys() -> ProviderKeys {
        ProviderKeys { openai: Some("sk-test".into()), huggingface: Some("hf-test".into()) }
    }

    /// `AppState` with both providers keyed and the given LLM.
    #[must_use]
    pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
        AppState::new(Session::new(test_keys(), AiProvider::OpenAi), llm)
    }

    /// Seed an empty case with `system_prompt` and return its ID.
    pub async fn seed_case(state: &AppState, system_prompt: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut cases = state.cases.write().await;
        cases.insert(id, CaseState::new(id, system_prompt.to_string(), state.session.default_provider));
        id
    }

    /// Seed a case whose transcript alternates user/assistant over `contents`.
    pub async fn seed_case_with_messages(state: &AppState, contents: &[&str]) -> Uuid {
        let id = seed_case(state, "test prompt").await;
        let mut cases = state.cases.write().await;
        let case = cases.get_mut(&id).unwrap();
        for (i, content) in contents.iter().enumerate() {
            let sender = if i % 2 == 0 { Sender::User } else { Sender::Assistant };
            case.case
                .messages
                .push(Message::new(id, sender, (*content).to_string(), Vec::new()));
        }
        id
    }

    pub async fn messages_of(state: &AppState, case_id: Uuid) -> Vec<Message> {
        state.cases.read().await[&case_id].case.messages.clone()
    }

    pub async fn phase_of(state: &AppState, case_id: Uuid) -> ConversationPhase {
        state.cases.read().await[&case_id].phase
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
