//! Groq Chat - web chat front-end for an OpenAI-compatible completion API
//!
//! Serves a small chat page and relays each message, with a system prompt
//! chosen by personality or a rolling conversation history, to the
//! completion API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use crate::config::Config;
use crate::conversation::SessionStore;
use crate::core::{ChatEngine, ChatSettings};
use crate::providers::{OpenAICompatConfig, OpenAICompatProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat_engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groq_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    if config.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; chat requests will fail upstream authentication");
    }

    let personalities = config
        .personality_registry()
        .context("failed to load personalities")?;
    if let Some(path) = &config.personalities_file {
        tracing::info!("Loaded personality overrides from {}", path.display());
    }

    let provider = OpenAICompatProvider::new(
        OpenAICompatConfig::groq(config.groq_api_key.clone())
            .with_base_url(config.groq_base_url.clone())
            .with_timeout(config.request_timeout_secs),
    )
    .context("failed to build HTTP client")?;

    let sessions = SessionStore::new(config.max_sessions, config.history_max_stored);

    let chat_engine = Arc::new(ChatEngine::new(
        ChatSettings::from_config(&config),
        personalities,
        sessions,
        Arc::new(provider),
    ));

    tracing::info!(
        mode = ?config.mode,
        model = %config.model,
        "Chat engine ready"
    );

    let state = AppState {
        config,
        chat_engine,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Chat server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
