mod config;
mod errors;
mod letters;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ProviderKind};
use crate::letters::provider::{AnthropicProvider, TemplateProvider, TextProvider};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Letters API v{}", env!("CARGO_PKG_VERSION"));

    let provider = build_provider(&config)?;
    info!(
        "Text provider initialized: {} (max {} concurrent generations per request)",
        provider.name(),
        config.max_concurrent_generations
    );

    let state = AppState {
        config: config.clone(),
        provider,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser UI is served from a separate origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn TextProvider>> {
    match config.provider {
        ProviderKind::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the anthropic provider")?;
            let llm = LlmClient::new(api_key, Duration::from_secs(config.llm_timeout_secs))
                .context("Failed to build HTTP client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(AnthropicProvider::new(llm)))
        }
        ProviderKind::Template => Ok(Arc::new(TemplateProvider)),
    }
}
