//! Case routes: transcript, system prompt, provider selection, analysis.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorBody, ErrorCode};
use crate::llm::config::AiProvider;
use crate::llm::types::{AiResponse, LlmError};
use crate::services::analysis::{self, AnalysisError};
use crate::services::case::{self, CaseError};
use crate::services::conversation::{self, ConversationError};
use crate::state::{AppState, CaseSnapshot, FileRef, Message};

// =============================================================================
// ERRORS
// =============================================================================

/// Status plus `{code, message, error, retryable}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, err: &impl ErrorCode) -> Self {
        Self { status, body: ErrorBody::from_error(err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub(crate) fn llm_error_to_status(err: &LlmError) -> StatusCode {
    match err {
        LlmError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
        LlmError::TransportFailure { .. } | LlmError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        LlmError::ConfigParse(_) | LlmError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CaseError> for ApiError {
    fn from(err: CaseError) -> Self {
        let status = match err {
            CaseError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        Self::new(status, &err)
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        let status = match &err {
            ConversationError::CaseNotFound(_) => StatusCode::NOT_FOUND,
            ConversationError::Busy(_) => StatusCode::CONFLICT,
            ConversationError::Llm(e) => llm_error_to_status(e),
            ConversationError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, &err)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let status = match &err {
            AnalysisError::NoDocuments => StatusCode::BAD_REQUEST,
            AnalysisError::CaseNotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::Llm(e) => llm_error_to_status(e),
        };
        Self::new(status, &err)
    }
}

// =============================================================================
// BODIES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateCaseBody {
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
}

/// The reply text plus both transcript entries the send appended.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(flatten)]
    pub response: AiResponse,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct SystemPromptBody {
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderBody {
    pub provider: AiProvider,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub files: Vec<FileRef>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/cases`: create a case.
pub async fn create_case(
    State(state): State<AppState>,
    body: Option<Json<CreateCaseBody>>,
) -> (StatusCode, Json<CaseSnapshot>) {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    (StatusCode::CREATED, Json(case::create_case(&state, body.system_prompt).await))
}

/// `GET /api/cases/:id`: snapshot of one case.
pub async fn get_case(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CaseSnapshot>, ApiError> {
    Ok(Json(case::get_case(&state, id).await?))
}

/// `GET /api/cases/:id/messages`: the transcript.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(conversation::list_messages(&state, id).await?))
}

/// `POST /api/cases/:id/messages`: send and wait for the reply.
///
/// Blank text answers `204` without touching the transcript.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageBody>,
) -> Result<Response, ApiError> {
    let Some(exchange) = conversation::send_message(&state, id, &body.text, body.attachments).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let response = SendMessageResponse {
        response: AiResponse { message: exchange.assistant.content.clone(), error: None },
        messages: vec![exchange.user, exchange.assistant],
    };
    Ok(Json(response).into_response())
}

/// `DELETE /api/cases/:id/messages`: clear the transcript.
pub async fn clear_messages(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    conversation::clear_messages(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/cases/:id/system-prompt`: explicit save.
pub async fn save_system_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SystemPromptBody>,
) -> Result<Json<CaseSnapshot>, ApiError> {
    Ok(Json(case::save_system_prompt(&state, id, body.system_prompt).await?))
}

/// `DELETE /api/cases/:id/system-prompt`: back to the default.
pub async fn reset_system_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseSnapshot>, ApiError> {
    Ok(Json(case::reset_system_prompt(&state, id).await?))
}

/// `PUT /api/cases/:id/provider`: select the provider for later sends.
pub async fn switch_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProviderBody>,
) -> Result<Json<CaseSnapshot>, ApiError> {
    conversation::switch_provider(&state, id, body.provider).await?;
    Ok(Json(case::get_case(&state, id).await?))
}

/// `POST /api/cases/:id/analyze`: summarize uploaded documents by name.
pub async fn analyze_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AiResponse>, ApiError> {
    let reply = analysis::analyze_case_documents(&state, id, &body.files).await?;
    Ok(Json(AiResponse::from(Ok::<_, LlmError>(reply))))
}

#[cfg(test)]
#[path = "cases_test.rs"]
mod tests;
