//! Prompt composition and the case system-prompt save path.
//!
//! The system prompt never appears in the composed turn list; it travels as
//! its own argument to the adapter, which places it first on the wire.

use crate::llm::types::{AiMessage, AiRole};
use crate::state::{Case, Message, Sender};

/// Global default every new case starts with.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a legal assistant AI, trained to help with legal matters. Your role is to:
1. Provide clear, accurate legal information
2. Help understand legal documents and terminology
3. Assist in case analysis and strategy
4. Maintain strict confidentiality
5. Always clarify that you provide information, not legal advice
6. Recommend consulting with a qualified lawyer for specific legal advice

Please analyze the provided information and respond accordingly.

Note: Focus on Belgian law and legal system when providing advice or information.";

impl From<Sender> for AiRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Self::User,
            Sender::Assistant => Self::Assistant,
        }
    }
}

/// Map `history` to turns and append `new_input` as the trailing user turn.
///
/// Output length is always `history.len() + 1`. No truncation happens here.
#[must_use]
pub fn compose(history: &[Message], new_input: &str) -> Vec<AiMessage> {
    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.extend(history.iter().map(|msg| AiMessage { role: msg.sender.into(), content: msg.content.clone() }));
    turns.push(AiMessage::user(new_input));
    turns
}

/// A blank or absent prompt means the global default.
#[must_use]
pub fn resolve_system_prompt(value: Option<String>) -> String {
    value
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Explicit save of a case's system prompt. The only way it changes.
/// Saving a blank prompt restores the default.
pub fn save_system_prompt(case: &mut Case, value: String) {
    case.system_prompt = resolve_system_prompt(Some(value));
}

/// Restore the global default prompt on `case`.
pub fn reset_system_prompt(case: &mut Case) {
    case.system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
