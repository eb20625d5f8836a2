//! Per-run execution state.
//!
//! Every run of an [`Orchestrator`](crate::Orchestrator) works on its own
//! [`ExecutionContext`]: an arena of task records keyed by task name. Task
//! definitions stay immutable, so a second run can never observe the outputs
//! of a first one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CrewError;
use crate::task::TaskSpec;

/// Separator between the outputs of two dependencies in a context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// Lifecycle of a task within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// What happened to one task during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    pub output: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    run_id: Uuid,
    records: HashMap<String, TaskRecord>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            records: HashMap::new(),
        }
    }

    /// A fresh context with every task `Pending`.
    pub fn for_tasks(tasks: &[TaskSpec]) -> Self {
        let mut ctx = Self::new();
        ctx.reset(tasks);
        ctx
    }

    /// Forget everything and start a new run id with every task `Pending`.
    pub fn reset(&mut self, tasks: &[TaskSpec]) {
        self.run_id = Uuid::new_v4();
        self.records = tasks
            .iter()
            .map(|task| (task.name.clone(), TaskRecord::default()))
            .collect();
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record(&self, name: &str) -> Option<&TaskRecord> {
        self.records.get(name)
    }

    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.records.get(name).map(|r| r.status)
    }

    /// Output of a task, only once it has completed.
    pub fn output(&self, name: &str) -> Option<&str> {
        self.records
            .get(name)
            .filter(|r| r.status == TaskStatus::Completed)
            .and_then(|r| r.output.as_deref())
    }

    pub fn mark_running(&mut self, name: &str) -> DateTime<Utc> {
        let now = Utc::now();
        let record = self.records.entry(name.to_string()).or_default();
        record.status = TaskStatus::Running;
        record.started_at = Some(now);
        record.finished_at = None;
        record.output = None;
        record.error = None;
        now
    }

    pub fn mark_completed(&mut self, name: &str, output: impl Into<String>) -> DateTime<Utc> {
        let now = Utc::now();
        let record = self.records.entry(name.to_string()).or_default();
        record.status = TaskStatus::Completed;
        record.output = Some(output.into());
        record.finished_at = Some(now);
        now
    }

    pub fn mark_failed(&mut self, name: &str, error: impl Into<String>) {
        let record = self.records.entry(name.to_string()).or_default();
        record.status = TaskStatus::Failed;
        record.error = Some(error.into());
        record.finished_at = Some(Utc::now());
    }

    /// Render the outputs of `task`'s dependencies, in declared order, as a
    /// labeled context block.
    ///
    /// Every dependency must already be `Completed`; anything else means the
    /// pipeline ran out of order and is reported as [`CrewError::Ordering`].
    pub fn resolve_context(&self, task: &TaskSpec) -> Result<String, CrewError> {
        task.context
            .iter()
            .map(|dependency| {
                self.output(dependency)
                    .map(|output| format!("### {}\n{}", dependency, output))
                    .ok_or_else(|| CrewError::Ordering {
                        task: task.name.clone(),
                        dependency: dependency.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|sections| sections.join(CONTEXT_SEPARATOR))
    }
}
