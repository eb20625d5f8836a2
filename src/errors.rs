//! Error types for building and running a research crew.
//!
//! Configuration problems are caught by [`Orchestrator::build`](crate::Orchestrator::build)
//! before anything executes. Everything that goes wrong while the pipeline is
//! running is a [`CrewError`].

use thiserror::Error;

use crate::agents::AgentError;

/// A topic, pipeline or definition file that cannot be turned into a runnable
/// crew. Always raised before any agent or tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("pipeline has no tasks")]
    EmptyPipeline,

    #[error("task name must not be empty")]
    EmptyTaskName,

    #[error("duplicate task name '{0}'")]
    DuplicateTask(String),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("task '{task}' depends on '{dependency}', which is declared after it")]
    ForwardReference { task: String, dependency: String },

    #[error("cyclic task dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("task '{task}' references undefined template variable '{{{variable}}}'")]
    MissingTemplateVariable { task: String, variable: String },

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("task '{task}' is assigned to unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("invalid pipeline definition: {0}")]
    InvalidDefinition(String),
}

/// Failure of a crew run.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A task was reached while one of its dependencies had not completed.
    #[error("task '{task}' started before its dependency '{dependency}' completed")]
    Ordering { task: String, dependency: String },

    /// A task's agent failed or produced no answer. The pipeline stops here.
    #[error("task '{task}' failed: {source}")]
    TaskExecution {
        task: String,
        #[source]
        source: AgentError,
    },
}

impl CrewError {
    /// Name of the task the error is about, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => None,
            Self::Ordering { task, .. } | Self::TaskExecution { task, .. } => Some(task),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
