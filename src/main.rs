use std::sync::Arc;

use lexia::llm::LlmClient;
use lexia::llm::config::{AiProvider, LlmConfig, ProviderKeys};
use lexia::routes;
use lexia::state::{AppState, Session};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let config = LlmConfig::from_env().expect("invalid LLM configuration");
    let llm = LlmClient::from_config(&config).expect("LLM client init failed");

    let keys = ProviderKeys::from_env();
    for provider in [AiProvider::OpenAi, AiProvider::HuggingFace] {
        if keys.get(provider).is_none() {
            tracing::warn!(%provider, "no API key set; requests to this provider will be rejected");
        }
    }

    tracing::info!(
        default_provider = %config.default_provider,
        openai_model = llm.model(AiProvider::OpenAi),
        huggingface_model = llm.model(AiProvider::HuggingFace),
        "llm client ready"
    );

    let state = AppState::new(Session::new(keys, config.default_provider), Arc::new(llm));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "lexia listening");
    axum::serve(listener, app).await.expect("server failed");
}
