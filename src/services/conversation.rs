//! Conversation store: per-case send / clear / provider switch.
//!
//! DESIGN
//! ======
//! Each case runs a two-state machine: `Idle → AwaitingResponse → Idle`.
//! `send` appends the user message and flips to `AwaitingResponse` in one
//! critical section, so the sender sees the echo immediately and a second
//! `send` (or `clear`) for the same case is rejected with `Busy` until the
//! reply lands. Different cases never contend beyond the map lock.
//!
//! The provider call runs on a spawned task that also applies the outcome.
//! Once dispatched it completes even if the caller stops waiting; there is
//! no abort.
//!
//! On failure the user message stays in the transcript and no assistant
//! message is added. Nothing is retried.
//!
//! Only the most recent `AI_MAX_HISTORY_MESSAGES` prior messages are sent
//! as context, starting on a user turn; the stored transcript is never
//! trimmed.

use std::sync::OnceLock;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::prompt;
use crate::error::ErrorCode;
use crate::llm::config::{AiProvider, ProviderConfig, env_parse};
use crate::llm::types::{AiMessage, LlmError, RequestKind};
use crate::state::{AppState, ConversationPhase, FileRef, Message, Sender};

const DEFAULT_AI_MAX_HISTORY_MESSAGES: usize = 40;

fn ai_max_history_messages() -> usize {
    static VALUE: OnceLock<usize> = OnceLock::new();
    *VALUE.get_or_init(|| env_parse("AI_MAX_HISTORY_MESSAGES", DEFAULT_AI_MAX_HISTORY_MESSAGES))
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("case not found: {0}")]
    CaseNotFound(Uuid),
    #[error("case {0} is still waiting for a response")]
    Busy(Uuid),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("AI request task failed: {0}")]
    TaskFailed(String),
}

impl ErrorCode for ConversationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CaseNotFound(_) => "E_CASE_NOT_FOUND",
            Self::Busy(_) => "E_CASE_BUSY",
            Self::Llm(e) => e.error_code(),
            Self::TaskFailed(_) => "E_TASK_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Busy(_) => true,
            Self::Llm(e) => e.retryable(),
            Self::CaseNotFound(_) | Self::TaskFailed(_) => false,
        }
    }
}

/// The two messages a successful `send` appended, in transcript order.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
}

/// Everything the dispatch task needs, captured under the lock.
struct PendingTurn {
    case_id: Uuid,
    turns: Vec<AiMessage>,
    system_prompt: String,
    config: ProviderConfig,
}

// =============================================================================
// SEND
// =============================================================================

/// Send `text` on `case_id`'s conversation.
///
/// Blank input is a silent no-op and returns `Ok(None)`.
///
/// # Errors
///
/// - [`ConversationError::Busy`] when the case is already awaiting a reply;
///   nothing is appended.
/// - [`ConversationError::Llm`] when the provider fails; the user message is
///   kept and the case returns to idle.
pub async fn send_message(
    state: &AppState,
    case_id: Uuid,
    text: &str,
    attachments: Vec<FileRef>,
) -> Result<Option<Exchange>, ConversationError> {
    if text.trim().is_empty() {
        debug!(%case_id, "conversation: ignoring blank input");
        return Ok(None);
    }

    let (user_message, pending) = {
        let mut cases = state.cases.write().await;
        let entry = cases
            .get_mut(&case_id)
            .ok_or(ConversationError::CaseNotFound(case_id))?;
        if entry.phase == ConversationPhase::AwaitingResponse {
            warn!(%case_id, "conversation: send rejected, response pending");
            return Err(ConversationError::Busy(case_id));
        }

        let history = history_window(&entry.case.messages, ai_max_history_messages());
        if history.len() < entry.case.messages.len() {
            debug!(
                %case_id,
                dropped = entry.case.messages.len() - history.len(),
                "conversation: oldest turns left out of context"
            );
        }
        let turns = prompt::compose(history, text);

        let user_message = Message::new(case_id, Sender::User, text.to_string(), attachments);
        entry.case.messages.push(user_message.clone());
        entry.phase = ConversationPhase::AwaitingResponse;

        let pending = PendingTurn {
            case_id,
            turns,
            system_prompt: entry.case.system_prompt.clone(),
            config: state.session.provider_config(entry.provider),
        };
        (user_message, pending)
    };

    info!(
        %case_id,
        provider = %pending.config.provider,
        turns = pending.turns.len(),
        "conversation: user message appended, awaiting response"
    );

    let task_state = state.clone();
    let handle = tokio::spawn(async move { complete_turn(&task_state, pending).await });

    match handle.await {
        Ok(result) => result.map(|assistant| Some(Exchange { user: user_message, assistant })),
        Err(e) => {
            warn!(%case_id, error = %e, "conversation: dispatch task failed");
            if let Some(entry) = state.cases.write().await.get_mut(&case_id) {
                entry.phase = ConversationPhase::Idle;
            }
            Err(ConversationError::TaskFailed(e.to_string()))
        }
    }
}

/// Call the provider and apply the outcome to the case.
async fn complete_turn(state: &AppState, pending: PendingTurn) -> Result<Message, ConversationError> {
    let PendingTurn { case_id, turns, system_prompt, config } = pending;
    let result = state
        .llm
        .send(&turns, &system_prompt, &config, RequestKind::Conversation)
        .await;

    let mut cases = state.cases.write().await;
    let Some(entry) = cases.get_mut(&case_id) else {
        warn!(%case_id, "conversation: case vanished before reply arrived");
        return Err(ConversationError::CaseNotFound(case_id));
    };
    entry.phase = ConversationPhase::Idle;

    match result {
        Ok(reply) => {
            let assistant = Message::new(case_id, Sender::Assistant, reply.text, Vec::new());
            entry.case.messages.push(assistant.clone());
            info!(%case_id, reply_len = assistant.content.len(), "conversation: assistant reply appended");
            Ok(assistant)
        }
        Err(e) => {
            warn!(%case_id, error = %e, "conversation: reply failed, user message retained");
            Err(e.into())
        }
    }
}

/// The most recent `max` messages; `max == 0` disables the window.
///
/// A truncated window never opens on an assistant reply whose question was
/// cut, so its start moves forward to the first user message.
pub(crate) fn history_window(messages: &[Message], max: usize) -> &[Message] {
    if max == 0 || messages.len() <= max {
        return messages;
    }
    let window = &messages[messages.len() - max..];
    let first_user = window
        .iter()
        .position(|m| m.sender == Sender::User)
        .unwrap_or(window.len());
    &window[first_user..]
}

// =============================================================================
// CLEAR / SWITCH / READ
// =============================================================================

/// Empty the transcript. Only allowed while idle.
///
/// # Errors
///
/// Returns [`ConversationError::Busy`] while a reply is pending.
pub async fn clear_messages(state: &AppState, case_id: Uuid) -> Result<(), ConversationError> {
    let mut cases = state.cases.write().await;
    let entry = cases
        .get_mut(&case_id)
        .ok_or(ConversationError::CaseNotFound(case_id))?;
    if entry.phase == ConversationPhase::AwaitingResponse {
        warn!(%case_id, "conversation: clear rejected, response pending");
        return Err(ConversationError::Busy(case_id));
    }
    let cleared = entry.case.messages.len();
    entry.case.messages.clear();
    info!(%case_id, cleared, "conversation: cleared");
    Ok(())
}

/// Select the provider for subsequent sends. Never replays or touches
/// existing messages; an in-flight request keeps the provider it started on.
///
/// # Errors
///
/// Returns [`ConversationError::CaseNotFound`] for unknown IDs.
pub async fn switch_provider(
    state: &AppState,
    case_id: Uuid,
    provider: AiProvider,
) -> Result<AiProvider, ConversationError> {
    let mut cases = state.cases.write().await;
    let entry = cases
        .get_mut(&case_id)
        .ok_or(ConversationError::CaseNotFound(case_id))?;
    let previous = std::mem::replace(&mut entry.provider, provider);
    info!(%case_id, from = %previous, to = %provider, "conversation: provider switched");
    Ok(previous)
}

/// # Errors
///
/// Returns [`ConversationError::CaseNotFound`] for unknown IDs.
pub async fn list_messages(state: &AppState, case_id: Uuid) -> Result<Vec<Message>, ConversationError> {
    let cases = state.cases.read().await;
    cases
        .get(&case_id)
        .map(|entry| entry.case.messages.clone())
        .ok_or(ConversationError::CaseNotFound(case_id))
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
