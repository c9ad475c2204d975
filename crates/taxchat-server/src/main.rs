//! Tax chat HTTP server.
//!
//! Run with: cargo run -p taxchat-server
//!
//! Requires `GOOGLE_API_KEY` in the environment or a `.env` file.

mod config;

use std::sync::Arc;

use anyhow::Context;
use taxchat_model::GeminiClient;
use taxchat_session::{ChatService, storage::MemorySessionStore};
use taxchat_transport::{API_PREFIX, HttpState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    tracing::debug!(?settings, "Settings loaded");

    let store = MemorySessionStore::new().with_max_turns(settings.max_history_turns);
    let model = GeminiClient::new(settings.gemini_config()).context("failed to build model client")?;
    tracing::info!(model = model.model(), "Using Gemini model");

    let chat = ChatService::new(Arc::new(store), Arc::new(model), settings.prompt_assembler());
    let state = HttpState::new(Arc::new(chat), settings.api_info());
    let app = create_router(state, &settings.allowed_origins()?);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{addr}{API_PREFIX}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
