//! Sequential, context-propagating task execution.
//!
//! The [`Orchestrator`] runs the tasks of a pipeline strictly in declaration
//! order. Before each task it renders the outputs of the task's dependencies
//! into the prompt; after each task it records the answer in the run's
//! [`ExecutionContext`]. The first failure stops the run and no partial
//! result is returned.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::agents::{AgentError, AgentExecutor};
use crate::context::ExecutionContext;
use crate::errors::{ConfigurationError, CrewError};
use crate::pipeline::PipelineDefinition;
use crate::run_result::RunResult;
use crate::task::TaskSpec;
use crate::tasks::TaskOutput;
use crate::utilities::{Printer, PrinterColor};

/// Called with every task output as soon as the task completes.
pub type TaskCallback = Arc<dyn Fn(&TaskOutput) + Send + Sync>;

pub struct Orchestrator {
    topic: String,
    tasks: Vec<TaskSpec>,
    executor: Arc<dyn AgentExecutor>,
    task_callback: Option<TaskCallback>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("topic", &self.topic)
            .field("tasks", &self.tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>())
            .field("executor", &self.executor.name())
            .field("has_task_callback", &self.task_callback.is_some())
            .finish()
    }
}

impl Orchestrator {
    /// Validate `topic` and `definition` and bind the topic into every task.
    ///
    /// Nothing is executed here; on error no agent or tool has been touched.
    pub fn build(
        topic: &str,
        definition: &PipelineDefinition,
        executor: Arc<dyn AgentExecutor>,
    ) -> Result<Self, ConfigurationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ConfigurationError::EmptyTopic);
        }

        let tasks = definition.instantiate(topic)?;
        log::debug!(
            "Built pipeline for '{}': {}",
            topic,
            tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(" -> ")
        );

        Ok(Self {
            topic: topic.to_string(),
            tasks,
            executor,
            task_callback: None,
        })
    }

    pub fn with_task_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TaskOutput) + Send + Sync + 'static,
    {
        self.task_callback = Some(Arc::new(callback));
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Execute the pipeline once with fresh state.
    pub async fn run(&self) -> Result<RunResult, CrewError> {
        let mut ctx = ExecutionContext::for_tasks(&self.tasks);
        self.run_with_context(&mut ctx).await
    }

    /// Execute the pipeline, recording task state in `ctx`.
    ///
    /// `ctx` is reset first, so whatever it held before is discarded. After a
    /// failed run it shows which task failed and which never started.
    pub async fn run_with_context(&self, ctx: &mut ExecutionContext) -> Result<RunResult, CrewError> {
        ctx.reset(&self.tasks);
        log::info!(
            "Starting run {} on '{}' ({} tasks, executor={})",
            ctx.run_id(),
            self.topic,
            self.tasks.len(),
            self.executor.name()
        );

        let mut tasks_output = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let output = self.execute_task(task, ctx).await.map_err(|e| {
                log::error!("Run {} halted: {}", ctx.run_id(), e);
                e
            })?;

            if let Some(ref callback) = self.task_callback {
                callback(&output);
            }
            tasks_output.push(output);
        }

        let result = RunResult::new(ctx.run_id(), self.topic.clone(), Utc::now(), tasks_output);
        log::info!("Run {} completed at {}", result.run_id(), result.formatted_timestamp());
        Ok(result)
    }

    async fn execute_task(&self, task: &TaskSpec, ctx: &mut ExecutionContext) -> Result<TaskOutput, CrewError> {
        let context = match ctx.resolve_context(task) {
            Ok(context) => context,
            Err(e) => {
                ctx.mark_failed(&task.name, e.to_string());
                return Err(e);
            }
        };
        let prompt = task.prompt_with_context(&context);

        let started_at = ctx.mark_running(&task.name);
        log::info!("Task '{}' started (agent: {})", task.name, task.agent.role);
        log::debug!("Task '{}' prompt:\n{}", task.name, prompt);

        let printer = Printer::new();
        if task.agent.verbose {
            printer.print(&format!("# Agent: {}", task.agent.role), PrinterColor::BoldPurple);
            printer.print(&format!("## Task: {}", task.description), PrinterColor::Green);
        }

        let answer = match self.executor.execute(&task.agent, &prompt).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => return Err(Self::fail(task, ctx, AgentError::EmptyAnswer)),
            Err(e) => return Err(Self::fail(task, ctx, e)),
        };

        let finished_at = ctx.mark_completed(&task.name, answer.clone());
        log::info!("Task '{}' completed ({} chars)", task.name, answer.len());
        if task.agent.verbose {
            printer.print(&format!("## Final Answer:\n{}", answer), PrinterColor::BoldGreen);
        }

        Ok(TaskOutput::new(
            task.name.clone(),
            task.description.clone(),
            task.expected_output.clone(),
            task.agent.role.clone(),
            answer,
            started_at,
            finished_at,
        ))
    }

    fn fail(task: &TaskSpec, ctx: &mut ExecutionContext, source: AgentError) -> CrewError {
        ctx.mark_failed(&task.name, source.to_string());
        if task.agent.verbose {
            Printer::new().print(&format!("## Task '{}' failed: {}", task.name, source), PrinterColor::Red);
        }
        CrewError::TaskExecution {
            task: task.name.clone(),
            source,
        }
    }
}
