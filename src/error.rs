//! Stable error codes shared by every service error.
//!
//! Each service error maps to a machine-readable `E_*` code so the HTTP layer
//! and the dashboard can branch on the failure kind without parsing messages.

use serde::Serialize;

use crate::llm::types::AiResponse;

/// Grepable error code plus whether the caller may simply try again.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error envelope returned by API routes.
///
/// Carries the dashboard's `{message, error}` response shape with an empty
/// `message`, so failure text never reads as an assistant reply.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    #[serde(flatten)]
    pub response: AiResponse,
    pub retryable: bool,
}

impl ErrorBody {
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self {
            code: err.error_code(),
            response: AiResponse::failure(err.to_string()),
            retryable: err.retryable(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
