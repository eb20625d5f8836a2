//! The seam between the orchestrator and whatever turns a prompt into text.

use async_trait::async_trait;
use thiserror::Error;

use crate::agent::Agent;
use crate::llms::base_llm::LLMError;

/// Why an agent could not produce an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent '{role}' has no tools")]
    NoTools { role: String },

    #[error("Error in {tool}: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("agent '{role}' got no usable tool output: {detail}")]
    AllToolsFailed { role: String, detail: String },

    #[error(transparent)]
    Llm(#[from] LLMError),

    #[error("agent exceeded its tool-call budget of {budget} without a final answer")]
    MaxIterationsExceeded { budget: usize },

    #[error("agent returned an empty answer")]
    EmptyAnswer,
}

/// Produces one final text answer for an agent and a composed prompt.
///
/// Implementations may call the agent's tools any number of times within
/// [`Agent::tool_call_budget`]. They never see or change run state; the
/// orchestrator records whatever they return.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, agent: &Agent, prompt: &str) -> Result<String, AgentError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "executor"
    }
}
