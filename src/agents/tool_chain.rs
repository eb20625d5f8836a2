//! Executor that answers by calling the agent's tools directly.

use async_trait::async_trait;

use super::executor::{AgentError, AgentExecutor};
use crate::agent::{Agent, ToolFailurePolicy};
use crate::tools::ToolOutput;
use crate::utilities::{Printer, PrinterColor};

/// Sends the composed prompt to each of the agent's tools in order, up to the
/// tool-call budget, and joins what they return.
///
/// No language model is involved, which makes this executor deterministic
/// for deterministic tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolChainExecutor;

impl ToolChainExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentExecutor for ToolChainExecutor {
    async fn execute(&self, agent: &Agent, prompt: &str) -> Result<String, AgentError> {
        if agent.tools.is_empty() {
            return Err(AgentError::NoTools {
                role: agent.role.clone(),
            });
        }

        let printer = Printer::new();
        let budget = agent.tool_call_budget();
        let mut sections = Vec::with_capacity(agent.tools.len().min(budget));
        let mut failures = Vec::new();
        let mut invoked = 0;

        for tool in agent.tools.iter().take(budget) {
            if agent.verbose {
                printer.print(
                    &format!("# Agent: {} -> {}", agent.role, tool.name()),
                    PrinterColor::BoldPurple,
                );
            }

            invoked += 1;
            match tool.invoke(prompt).await {
                ToolOutput::Success(text) => sections.push(text),
                ToolOutput::Failure { tool, detail } => match agent.tool_failure_policy {
                    ToolFailurePolicy::Abort => return Err(AgentError::ToolFailed { tool, detail }),
                    ToolFailurePolicy::Degrade => {
                        let failure = ToolOutput::Failure { tool, detail }.into_text();
                        if agent.verbose {
                            printer.print(&failure, PrinterColor::Red);
                        }
                        sections.push(failure.clone());
                        failures.push(failure);
                    }
                },
            }
        }

        if agent.tools.len() > budget {
            log::debug!(
                "Agent '{}' used {} of {} tools (budget {})",
                agent.role,
                invoked,
                agent.tools.len(),
                budget
            );
        }

        // Degraded text only rides along with at least one real result.
        if failures.len() == invoked {
            return Err(AgentError::AllToolsFailed {
                role: agent.role.clone(),
                detail: failures.join("; "),
            });
        }

        Ok(sections.join("\n\n"))
    }

    fn name(&self) -> &str {
        "tool_chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolAdapter, ToolError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn echo(name: &str) -> ToolAdapter {
        let prefix = format!("{}:", name);
        ToolAdapter::function(name, "echo", move |q: &str| Ok(format!("{}{}", prefix, q)))
    }

    fn failing() -> ToolAdapter {
        ToolAdapter::function("Gemini Research", "fails", |_: &str| Err(ToolError::backend("quota exceeded")))
    }

    #[tokio::test]
    async fn test_joins_tool_outputs_in_order() {
        let agent = Agent::new("Market Research Specialist", "g", "b")
            .with_delegation(true)
            .with_tools(vec![echo("A"), echo("B")]);
        let answer = ToolChainExecutor.execute(&agent, "EV").await.unwrap();
        assert_eq!(answer, "A:EV\n\nB:EV");
    }

    #[tokio::test]
    async fn test_budget_limits_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tools = (0..3)
            .map(|i| {
                let calls = calls.clone();
                ToolAdapter::function(format!("T{}", i), "counts", move |_: &str| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("ok".to_string())
                })
            })
            .collect();
        let agent = Agent::new("r", "g", "b").with_tools(tools);

        ToolChainExecutor.execute(&agent, "q").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_degrade_keeps_failure_text() {
        let agent = Agent::new("r", "g", "b")
            .with_delegation(true)
            .with_tools(vec![failing(), echo("A")]);
        let answer = ToolChainExecutor.execute(&agent, "EV").await.unwrap();
        assert!(answer.starts_with("Error in Gemini Research: quota exceeded"));
        assert!(answer.ends_with("A:EV"));
    }

    #[tokio::test]
    async fn test_degrade_with_only_failures_is_an_error() {
        let agent = Agent::new("Technology Analyst", "g", "b")
            .with_delegation(true)
            .with_tool(failing());
        let err = ToolChainExecutor.execute(&agent, "EV").await.unwrap_err();
        match err {
            AgentError::AllToolsFailed { role, detail } => {
                assert_eq!(role, "Technology Analyst");
                assert_eq!(detail, "Error in Gemini Research: quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_abort_fails_on_first_failure() {
        let agent = Agent::new("r", "g", "b")
            .with_tool(failing())
            .with_tool_failure_policy(ToolFailurePolicy::Abort);
        let err = ToolChainExecutor.execute(&agent, "EV").await.unwrap_err();
        match err {
            AgentError::ToolFailed { tool, detail } => {
                assert_eq!(tool, "Gemini Research");
                assert_eq!(detail, "quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_tools() {
        let agent = Agent::new("Strategic Insights Analyst", "g", "b");
        assert!(matches!(
            ToolChainExecutor.execute(&agent, "EV").await,
            Err(AgentError::NoTools { .. })
        ));
    }
}
