//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard talks to this service over JSON. Every endpoint hangs off a
//! case ID; the router only translates between HTTP and the service layer.

pub mod cases;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cases", post(cases::create_case))
        .route("/api/cases/{id}", get(cases::get_case))
        .route(
            "/api/cases/{id}/messages",
            get(cases::list_messages)
                .post(cases::send_message)
                .delete(cases::clear_messages),
        )
        .route(
            "/api/cases/{id}/system-prompt",
            put(cases::save_system_prompt).delete(cases::reset_system_prompt),
        )
        .route("/api/cases/{id}/provider", put(cases::switch_provider))
        .route("/api/cases/{id}/analyze", post(cases::analyze_documents))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
