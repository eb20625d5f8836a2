//! research-crew HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY`, `GEMINI_MODEL` - Gemini backend
//! - `TAVILY_API_KEY` - web search backend
//! - `CREW_EXECUTOR`, `CREW_MAX_ITER`, `CREW_VERBOSE` - agent behavior
//! - `RUST_LOG` - Tracing filter (default: "info,research_crew=debug")
//!
//! A `.env` file in the working directory is loaded first.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use research_crew::server::{app_router, AppState};
use research_crew::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,research_crew=debug".into()),
        )
        .init();

    let settings = Settings::from_env();
    let bind_addr = settings.bind_addr();
    if settings.tavily_api_key.is_none() {
        tracing::warn!("TAVILY_API_KEY is not set; web search calls will fail");
    }
    if settings.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; research calls will fail");
    }

    let state = AppState::from_settings(&settings).context("failed to build the research pipeline")?;
    let app = app_router(state);

    tracing::info!("research-crew server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health   - liveness probe");
    tracing::info!("  POST /research - run the crew on a topic");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
