//! LLM-driven ReAct executor.
//!
//! The model is shown the agent persona, its tools and the task prompt, then
//! alternates `Thought / Action / Action Input` steps with tool observations
//! until it emits a `Final Answer`. Every action counts against the agent's
//! tool-call budget, so a misbehaving model cannot loop forever.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::executor::{AgentError, AgentExecutor};
use super::parser::{parse, AgentStep};
use crate::agent::{Agent, ToolFailurePolicy};
use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::tools::ToolOutput;
use crate::utilities::{Printer, PrinterColor};

/// Stop sequence that keeps the model from inventing its own observations.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Executor that reasons with a [`BaseLLM`] and calls tools on its behalf.
pub struct ReactExecutor {
    llm: Arc<dyn BaseLLM>,
}

impl fmt::Debug for ReactExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactExecutor")
            .field("model", &self.llm.model())
            .field("provider", &self.llm.provider())
            .finish()
    }
}

impl ReactExecutor {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm }
    }

    /// System prompt: persona, tools and the response format.
    fn system_message(agent: &Agent) -> String {
        let tools_section = if agent.tools.is_empty() {
            "You have no tools. Answer from what you already know.".to_string()
        } else {
            format!(
                "You ONLY have access to the following tools, and should NEVER make up tools that are not listed here:\n\n{}\n\n\
                 To use a tool, respond with:\n\n\
                 Thought: you should always think about what to do\n\
                 Action: the action to take, only one name of [{}], just the name, exactly as it's written.\n\
                 Action Input: the input to the action\n\
                 Observation: the result of the action\n\n\
                 This Thought/Action/Action Input/Observation sequence can repeat at most {} time(s).",
                agent.tools_description(),
                agent.tool_names().join(", "),
                agent.tool_call_budget()
            )
        };

        format!(
            "{}\n\n{}\n\nOnce all necessary information is gathered, respond with:\n\n\
             Thought: I now know the final answer\n\
             Final Answer: the final answer to the original input question",
            agent.system_prompt(),
            tools_section
        )
    }

    /// Run one tool call and turn it into observation text.
    async fn observe(agent: &Agent, tool_name: &str, tool_input: &str) -> Result<String, AgentError> {
        let Some(tool) = agent.find_tool(tool_name) else {
            return Ok(format!(
                "Action '{}' don't exist, these are the only available Actions: {}",
                tool_name,
                agent.tool_names().join(", ")
            ));
        };

        match tool.invoke(tool_input).await {
            ToolOutput::Success(text) => Ok(text),
            ToolOutput::Failure { tool, detail } => match agent.tool_failure_policy {
                ToolFailurePolicy::Abort => Err(AgentError::ToolFailed { tool, detail }),
                ToolFailurePolicy::Degrade => Ok(ToolOutput::Failure { tool, detail }.into_text()),
            },
        }
    }
}

#[async_trait]
impl AgentExecutor for ReactExecutor {
    async fn execute(&self, agent: &Agent, prompt: &str) -> Result<String, AgentError> {
        let printer = Printer::new();
        let budget = agent.tool_call_budget();
        let stop = vec![OBSERVATION_STOP.to_string()];
        let mut messages = vec![
            LLMMessage::system(Self::system_message(agent)),
            LLMMessage::user(prompt),
        ];
        let mut actions = 0usize;
        let mut format_errors = 0usize;

        loop {
            let reply = self.llm.call(&messages, &stop).await?;

            let observation = match parse(&reply) {
                Ok(AgentStep::Finish { output, .. }) => {
                    if output.trim().is_empty() {
                        return Err(AgentError::EmptyAnswer);
                    }
                    if agent.verbose {
                        printer.print(&format!("## Final Answer: {}", output), PrinterColor::BoldGreen);
                    }
                    return Ok(output);
                }
                Ok(AgentStep::Action { tool, tool_input, .. }) => {
                    if actions >= budget {
                        log::warn!("Agent '{}' hit its tool-call budget of {}", agent.role, budget);
                        return Err(AgentError::MaxIterationsExceeded { budget });
                    }
                    actions += 1;
                    if agent.verbose {
                        printer.print(
                            &format!("## Using tool: {}\n## Tool Input: {}", tool, tool_input),
                            PrinterColor::BoldPurple,
                        );
                    }
                    Self::observe(agent, &tool, &tool_input).await?
                }
                Err(e) => {
                    format_errors += 1;
                    if format_errors > budget {
                        return Err(AgentError::MaxIterationsExceeded { budget });
                    }
                    log::debug!("Unparseable agent output from '{}': {}", agent.role, e);
                    e.message
                }
            };

            messages.push(LLMMessage::assistant(reply));
            messages.push(LLMMessage::user(format!("Observation: {}", observation)));
        }
    }

    fn name(&self) -> &str {
        "react"
    }
}
