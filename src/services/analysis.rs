//! Document analysis bridge.
//!
//! Turns a list of uploaded file names into a single user turn and runs it
//! through the adapter at the lower analysis temperature. Only names are
//! forwarded; file contents never leave the dashboard. The case transcript
//! is not touched.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::config::ProviderConfig;
use crate::llm::types::{AiMessage, AiReply, LlmError, RequestKind};
use crate::state::{AppState, FileRef};

pub const ANALYSIS_INSTRUCTION: &str = "Please analyze the following documents and provide a summary:";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no documents to analyze")]
    NoDocuments,
    #[error("case not found: {0}")]
    CaseNotFound(Uuid),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoDocuments => "E_NO_DOCUMENTS",
            Self::CaseNotFound(_) => "E_CASE_NOT_FOUND",
            Self::Llm(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

/// File names with surrounding whitespace trimmed and blanks dropped.
pub(crate) fn usable_names<S: AsRef<str>>(file_names: &[S]) -> Vec<&str> {
    file_names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Build the analysis turn: instruction, blank line, then one name per
/// paragraph. Returns `None` when no usable names remain.
#[must_use]
pub fn build_analysis_turn<S: AsRef<str>>(file_names: &[S]) -> Option<AiMessage> {
    let names = usable_names(file_names);
    if names.is_empty() {
        return None;
    }
    Some(AiMessage::user(format!("{ANALYSIS_INSTRUCTION}\n\n{}", names.join("\n\n"))))
}

/// Ask the provider in `config` to summarize `file_names`.
///
/// # Errors
///
/// [`AnalysisError::NoDocuments`] for an empty (or all-blank) list, checked
/// before any dispatch; otherwise whatever the adapter returns.
pub async fn analyze_documents<S: AsRef<str>>(
    llm: &dyn LlmChat,
    file_names: &[S],
    system_prompt: &str,
    config: &ProviderConfig,
) -> Result<AiReply, AnalysisError> {
    let names = usable_names(file_names);
    let turn = build_analysis_turn(names.as_slice()).ok_or(AnalysisError::NoDocuments)?;
    info!(provider = %config.provider, documents = names.len(), "analysis: dispatching");

    let reply = llm
        .send(std::slice::from_ref(&turn), system_prompt, config, RequestKind::DocumentAnalysis)
        .await
        .inspect_err(|e| warn!(provider = %config.provider, error = %e, "analysis: request failed"))?;
    Ok(reply)
}

/// Analyze `files` using the case's system prompt and selected provider.
///
/// # Errors
///
/// [`AnalysisError::CaseNotFound`] for unknown IDs, plus everything
/// [`analyze_documents`] returns.
pub async fn analyze_case_documents(
    state: &AppState,
    case_id: Uuid,
    files: &[FileRef],
) -> Result<AiReply, AnalysisError> {
    let (system_prompt, config) = {
        let cases = state.cases.read().await;
        let entry = cases.get(&case_id).ok_or(AnalysisError::CaseNotFound(case_id))?;
        (entry.case.system_prompt.clone(), state.session.provider_config(entry.provider))
    };
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    analyze_documents(state.llm.as_ref(), &names, &system_prompt, &config).await
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
