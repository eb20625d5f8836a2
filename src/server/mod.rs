//! HTTP front end for the research crew.
//!
//! # Endpoints
//!
//! - `GET  /health`   - Liveness probe
//! - `POST /research` - Run the crew on a topic

pub mod routes;

pub use routes::{app_router, AppState, ResearchRequest, ResearchResponse, INVALID_TOPIC_MESSAGE};
