//! Core Agent struct.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_ITER;
use crate::tools::ToolAdapter;
use crate::utilities::string_utils::{interpolate, tool_key, TemplateError};

/// What an agent does with a failed tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolFailurePolicy {
    /// Keep going; the failure text becomes part of what the agent saw.
    #[default]
    Degrade,
    /// Treat the first failed tool call as a failure of the whole task.
    Abort,
}

/// A research persona bound to a fixed set of tools.
///
/// Agents are built once per pipeline and never mutated while a run is in
/// progress; share them with `Arc`.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique identifier for the agent.
    pub id: Uuid,
    /// Role of the agent.
    pub role: String,
    /// Objective of the agent.
    pub goal: String,
    /// Backstory of the agent.
    pub backstory: String,
    /// Tools at the agent's disposal, in preference order.
    pub tools: Vec<ToolAdapter>,
    /// Whether the agent may make several tool calls before answering.
    pub allow_delegation: bool,
    /// Upper bound on tool calls per task when delegation is allowed.
    pub max_iter: usize,
    /// Reaction to a failed tool call.
    pub tool_failure_policy: ToolFailurePolicy,
    /// Print progress to the console while executing.
    pub verbose: bool,
}

impl Agent {
    /// Create a new Agent with required fields and no tools.
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            allow_delegation: false,
            max_iter: DEFAULT_MAX_ITER,
            tool_failure_policy: ToolFailurePolicy::default(),
            verbose: false,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolAdapter>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool(mut self, tool: ToolAdapter) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_delegation(mut self, allow_delegation: bool) -> Self {
        self.allow_delegation = allow_delegation;
        self
    }

    /// Set the tool-call budget. Zero is raised to one.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tool_failure_policy(mut self, policy: ToolFailurePolicy) -> Self {
        self.tool_failure_policy = policy;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Maximum number of tool calls this agent may make for one task.
    ///
    /// A non-delegating agent gets a single call; a delegating one gets
    /// `max_iter`.
    pub fn tool_call_budget(&self) -> usize {
        if self.allow_delegation {
            self.max_iter.max(1)
        } else {
            1
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolAdapter::name).collect()
    }

    /// Find a tool by exact name, falling back to a normalized match so that
    /// `tavily_search` finds "Tavily Search".
    pub fn find_tool(&self, name: &str) -> Option<&ToolAdapter> {
        let name = name.trim();
        self.tools.iter().find(|t| t.name() == name).or_else(|| {
            let key = tool_key(name);
            self.tools.iter().find(|t| tool_key(t.name()) == key)
        })
    }

    /// One line per tool: `name: description`.
    pub fn tools_description(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Persona block used as the system prompt of an LLM-backed executor.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }

    /// Copy of the agent with `inputs` interpolated into role, goal and
    /// backstory. The copy keeps the same id and tools.
    pub fn interpolated(&self, inputs: &HashMap<String, String>) -> Result<Self, TemplateError> {
        Ok(Self {
            role: interpolate(&self.role, inputs)?,
            goal: interpolate(&self.goal, inputs)?,
            backstory: interpolate(&self.backstory, inputs)?,
            ..self.clone()
        })
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent(role={}, tools=[{}])", self.role, self.tool_names().join(", "))
    }
}
