use std::sync::Arc;

use super::*;
use crate::error::ErrorCode;
use crate::llm::config::AiProvider;
use crate::state::ConversationPhase;
use crate::state::test_helpers::{self, MockLlm};

fn state() -> AppState {
    test_helpers::test_app_state_with_llm(Arc::new(MockLlm::new(Vec::new())))
}

#[tokio::test]
async fn create_case_uses_default_prompt() {
    let state = state();
    let snap = create_case(&state, None).await;
    assert_eq!(snap.system_prompt, prompt::DEFAULT_SYSTEM_PROMPT);
    assert!(snap.messages.is_empty());
    assert_eq!(snap.phase, ConversationPhase::Idle);
    assert_eq!(snap.provider, AiProvider::OpenAi);
    assert!(state.cases.read().await.contains_key(&snap.id));
}

#[tokio::test]
async fn create_case_blank_prompt_falls_back_to_default() {
    let state = state();
    let snap = create_case(&state, Some("   ".into())).await;
    assert_eq!(snap.system_prompt, prompt::DEFAULT_SYSTEM_PROMPT);
}

#[tokio::test]
async fn create_case_keeps_custom_prompt() {
    let state = state();
    let snap = create_case(&state, Some("Employment law only.".into())).await;
    assert_eq!(snap.system_prompt, "Employment law only.");
}

#[tokio::test]
async fn get_unknown_case_is_not_found() {
    let state = state();
    let missing = Uuid::new_v4();
    let err = get_case(&state, missing).await.unwrap_err();
    assert!(matches!(err, CaseError::NotFound(id) if id == missing));
    assert_eq!(err.error_code(), "E_CASE_NOT_FOUND");
}

#[tokio::test]
async fn save_then_reset_system_prompt() {
    let state = state();
    let id = test_helpers::seed_case(&state, "original").await;

    let saved = save_system_prompt(&state, id, "updated".into()).await.unwrap();
    assert_eq!(saved.system_prompt, "updated");
    assert_eq!(get_case(&state, id).await.unwrap().system_prompt, "updated");

    let reset = reset_system_prompt(&state, id).await.unwrap();
    assert_eq!(reset.system_prompt, prompt::DEFAULT_SYSTEM_PROMPT);
}

#[tokio::test]
async fn save_on_unknown_case_is_not_found() {
    let state = state();
    assert!(save_system_prompt(&state, Uuid::new_v4(), "x".into()).await.is_err());
    assert!(reset_system_prompt(&state, Uuid::new_v4()).await.is_err());
}

#[tokio::test]
async fn saving_blank_prompt_matches_creation_rule() {
    let state = state();
    let created = create_case(&state, Some("  ".into())).await;
    let id = test_helpers::seed_case(&state, "custom").await;
    let saved = save_system_prompt(&state, id, "  ".into()).await.unwrap();
    assert_eq!(saved.system_prompt, created.system_prompt);
    assert_eq!(saved.system_prompt, prompt::DEFAULT_SYSTEM_PROMPT);
}
