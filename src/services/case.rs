//! Case registry: create and read cases, save their system prompts.
//!
//! Cases live in memory for the lifetime of the process. Each new case gets
//! the global default prompt unless the caller supplies one, and starts on
//! the session's default provider.

use tracing::info;
use uuid::Uuid;

use super::prompt;
use crate::state::{AppState, CaseSnapshot, CaseState};

#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error("case not found: {0}")]
    NotFound(Uuid),
}

impl crate::error::ErrorCode for CaseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CASE_NOT_FOUND",
        }
    }
}

/// Create a case. A blank or absent `system_prompt` falls back to the default.
pub async fn create_case(state: &AppState, system_prompt: Option<String>) -> CaseSnapshot {
    let id = Uuid::new_v4();
    let system_prompt = prompt::resolve_system_prompt(system_prompt);
    let case = CaseState::new(id, system_prompt, state.session.default_provider);
    let snapshot = case.snapshot();

    state.cases.write().await.insert(id, case);
    info!(case_id = %id, provider = %snapshot.provider, "case: created");
    snapshot
}

/// # Errors
///
/// Returns [`CaseError::NotFound`] for unknown IDs.
pub async fn get_case(state: &AppState, case_id: Uuid) -> Result<CaseSnapshot, CaseError> {
    let cases = state.cases.read().await;
    cases
        .get(&case_id)
        .map(CaseState::snapshot)
        .ok_or(CaseError::NotFound(case_id))
}

/// Explicit save path for a case's system prompt. Takes effect on the next
/// request; anything already dispatched keeps the prompt it was sent with.
/// A blank value restores the default, as on creation.
///
/// # Errors
///
/// Returns [`CaseError::NotFound`] for unknown IDs.
pub async fn save_system_prompt(state: &AppState, case_id: Uuid, value: String) -> Result<CaseSnapshot, CaseError> {
    let mut cases = state.cases.write().await;
    let case = cases.get_mut(&case_id).ok_or(CaseError::NotFound(case_id))?;
    prompt::save_system_prompt(&mut case.case, value);
    info!(%case_id, prompt_len = case.case.system_prompt.len(), "case: system prompt saved");
    Ok(case.snapshot())
}

/// # Errors
///
/// Returns [`CaseError::NotFound`] for unknown IDs.
pub async fn reset_system_prompt(state: &AppState, case_id: Uuid) -> Result<CaseSnapshot, CaseError> {
    let mut cases = state.cases.write().await;
    let case = cases.get_mut(&case_id).ok_or(CaseError::NotFound(case_id))?;
    prompt::reset_system_prompt(&mut case.case);
    info!(%case_id, "case: system prompt reset to default");
    Ok(case.snapshot())
}

#[cfg(test)]
#[path = "case_test.rs"]
mod tests;
