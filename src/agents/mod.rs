//! Agent executors.
//!
//! An [`AgentExecutor`] turns an [`Agent`](crate::Agent) and a composed task
//! prompt into a final answer:
//!
//! - [`ToolChainExecutor`] calls the agent's tools directly.
//! - [`ReactExecutor`] lets an LLM decide which tools to call.

pub mod crew_agent_executor;
pub mod executor;
pub mod parser;
pub mod tool_chain;

use std::sync::Arc;

pub use crew_agent_executor::ReactExecutor;
pub use executor::{AgentError, AgentExecutor};
pub use parser::{AgentStep, OutputParserError};
pub use tool_chain::ToolChainExecutor;

use crate::config::{ExecutorKind, Settings};
use crate::llms::GeminiCompletion;

/// Executor selected by `settings.executor`. The ReAct executor reasons with
/// the configured Gemini model.
pub fn default_executor(settings: &Settings) -> Arc<dyn AgentExecutor> {
    match settings.executor {
        ExecutorKind::React => {
            let llm = GeminiCompletion::new(settings.gemini_model.clone(), settings.gemini_api_key.clone());
            Arc::new(ReactExecutor::new(Arc::new(llm)))
        }
        ExecutorKind::Tools => Arc::new(ToolChainExecutor::new()),
    }
}
