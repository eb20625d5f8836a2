//! Task output representation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The result of one completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Name of the task.
    pub name: String,
    /// Description of the task, after topic interpolation.
    pub description: String,
    /// Expected output of the task.
    pub expected_output: String,
    /// First ten words of the description.
    pub summary: String,
    /// Raw output of the task.
    pub raw: String,
    /// Role of the agent that executed the task.
    pub agent: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TaskOutput {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
        raw: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let description = description.into();
        Self {
            name: name.into(),
            summary: Self::generate_summary(&description),
            description,
            expected_output: expected_output.into(),
            raw: raw.into(),
            agent: agent.into(),
            started_at,
            finished_at,
        }
    }

    /// Generate a summary from the description (first 10 words + "...").
    fn generate_summary(description: &str) -> String {
        let excerpt = description.split_whitespace().take(10).collect::<Vec<_>>().join(" ");
        format!("{}...", excerpt)
    }

    /// Wall-clock execution time in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
