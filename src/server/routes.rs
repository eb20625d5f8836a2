//! Axum route handlers for the research server.
//!
//! # Routes
//!
//! - `GET  /health`   - Returns `{"status": "ok", "version": "..."}`
//! - `POST /research` - Accepts `{"topic": "..."}`, runs the pipeline and
//!   returns the report sections

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agents::{default_executor, AgentExecutor};
use crate::config::Settings;
use crate::errors::ConfigurationError;
use crate::orchestrator::Orchestrator;
use crate::pipeline::{PipelineDefinition, MARKET_RESEARCH, STRATEGY, TECH_ANALYSIS};
use crate::run_result::RunResult;
use crate::tools::ToolRegistry;

/// Shown when the submitted topic is blank.
pub const INVALID_TOPIC_MESSAGE: &str = "Please enter a valid topic.";

/// Shared application state for the HTTP server.
///
/// The pipeline definition is topic-independent; every request builds its
/// own orchestrator and runs with its own execution context.
#[derive(Clone)]
pub struct AppState {
    pub definition: Arc<PipelineDefinition>,
    pub executor: Arc<dyn AgentExecutor>,
}

impl AppState {
    pub fn new(definition: PipelineDefinition, executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            definition: Arc::new(definition),
            executor,
        }
    }

    /// The EV research crew wired to the backends configured in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        let registry = ToolRegistry::from_settings(settings);
        let definition = PipelineDefinition::load(None, &registry, settings)?;
        Ok(Self::new(definition, default_executor(settings)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
}

/// Report returned by `POST /research`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub run_id: Uuid,
    pub topic: String,
    /// Completion time, `%Y-%m-%d %H:%M:%S` (UTC).
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_research: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub outputs: HashMap<String, String>,
}

impl From<RunResult> for ResearchResponse {
    fn from(result: RunResult) -> Self {
        let section = |name: &str| result.output(name).map(str::to_string);
        Self {
            run_id: result.run_id(),
            topic: result.topic().to_string(),
            timestamp: result.formatted_timestamp(),
            market_research: section(MARKET_RESEARCH),
            tech_analysis: section(TECH_ANALYSIS),
            strategy: section(STRATEGY),
            outputs: result.outputs().clone(),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/research", post(research_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "research-crew",
    }))
}

/// POST /research - run the crew on a topic.
///
/// - blank topic: `400 {"error": "Please enter a valid topic."}`
/// - invalid pipeline: `400 {"error": ...}`
/// - a task failed: `502 {"error": ..., "task": ...}`
async fn research_handler(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, (StatusCode, Json<Value>)> {
    if request.topic.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_TOPIC_MESSAGE }))));
    }

    let orchestrator = Orchestrator::build(&request.topic, &state.definition, state.executor.clone())
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?;

    tracing::info!(topic = %orchestrator.topic(), "Starting research run");

    match orchestrator.run().await {
        Ok(result) => Ok(Json(ResearchResponse::from(result))),
        Err(e) => {
            tracing::error!(error = %e, "Research run failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": format!("Error during research process: {}", e),
                    "task": e.task(),
                })),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
