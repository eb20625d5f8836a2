//! # research-crew
//!
//! A sequential multi-agent research crew. A fixed pipeline of agents
//! (market research, technical analysis, strategic synthesis) runs one task
//! after another; every task sees the raw outputs of the tasks it depends on,
//! and the run ends in a timestamped [`RunResult`].
//!
//! The [`Orchestrator`] owns ordering, dependency-context injection and
//! fail-fast error propagation. Text generation is delegated to an
//! [`AgentExecutor`](agents::AgentExecutor), which in turn calls the agent's
//! [`ToolAdapter`]s (web search, Gemini research).

pub mod agent;
pub mod agents;
pub mod config;
pub mod context;
pub mod errors;
pub mod llms;
pub mod orchestrator;
pub mod pipeline;
pub mod run_result;
pub mod server;
pub mod task;
pub mod tasks;
pub mod tools;
pub mod utilities;

pub use agent::{Agent, ToolFailurePolicy};
pub use agents::{AgentError, AgentExecutor, ReactExecutor, ToolChainExecutor};
pub use config::Settings;
pub use context::{ExecutionContext, TaskStatus};
pub use errors::{ConfigurationError, CrewError};
pub use orchestrator::Orchestrator;
pub use pipeline::{PipelineDefinition, TaskDefinition};
pub use run_result::RunResult;
pub use task::TaskSpec;
pub use tasks::TaskOutput;
pub use tools::{ToolAdapter, ToolOutput, ToolRegistry};

/// Crate version, reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
