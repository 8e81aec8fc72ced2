//! In-process HTTP backend for adapter tests.
//!
//! Binds `127.0.0.1:0`, answers every path with a canned status and body, and
//! records what it received so tests can assert on the outbound wire shape.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct BackendState {
    status: StatusCode,
    body: Arc<String>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct MockBackend {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = BackendState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: Arc::new(body.into()),
            captured: captured.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { base_url: format!("http://{addr}"), captured }
    }

    pub async fn json(status: u16, body: serde_json::Value) -> Self {
        Self::start(status, body.to_string()).await
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("captured lock").clone()
    }
}

async fn handle(State(state): State<BackendState>, uri: Uri, headers: HeaderMap, body: String) -> (StatusCode, String) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    state
        .captured
        .lock()
        .expect("captured lock")
        .push(CapturedRequest { path: uri.path().to_string(), authorization, body });
    (state.status, state.body.as_str().to_owned())
}
