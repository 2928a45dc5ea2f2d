mod config;
mod error;
mod media;
mod provider;
mod relay;


use axum::{
    routing::{get, post},
    Router,
};
use config::Config;
use provider::ProviderClient;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: ProviderClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let provider = ProviderClient::new(&config.base_url, config.provider_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            provider,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(relay::chat).get(relay::status))
        .route(
            "/api/text-to-speech",
            post(media::text_to_speech).get(media::speech_status),
        )
        .route("/api/process-pdf", post(media::process_pdf))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr;
    info!("Relaying chat to {}", config.base_url);
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health() -> &'static str {
    "OK"
}
