//! The result bundle of a successful run.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tasks::TaskOutput;

/// Timestamp format used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Every task output of one completed run, plus when the run finished.
///
/// Only produced when all tasks completed; a failed run yields an error and
/// no partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    run_id: Uuid,
    topic: String,
    timestamp: DateTime<Utc>,
    outputs: HashMap<String, String>,
    tasks_output: Vec<TaskOutput>,
}

impl RunResult {
    /// Assemble a result from task outputs in execution order.
    pub fn new(
        run_id: Uuid,
        topic: impl Into<String>,
        timestamp: DateTime<Utc>,
        tasks_output: Vec<TaskOutput>,
    ) -> Self {
        let outputs = tasks_output
            .iter()
            .map(|output| (output.name.clone(), output.raw.clone()))
            .collect();
        Self {
            run_id,
            topic: topic.into(),
            timestamp,
            outputs,
            tasks_output,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Completion time of the run.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Task name to raw output.
    pub fn outputs(&self) -> &HashMap<String, String> {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }

    /// Task outputs in execution order.
    pub fn tasks_output(&self) -> &[TaskOutput] {
        &self.tasks_output
    }

    /// Raw output of the last task.
    pub fn final_output(&self) -> Option<&str> {
        self.tasks_output.last().map(|o| o.raw.as_str())
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.final_output().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn output(name: &str, raw: &str) -> TaskOutput {
        let at = Utc::now();
        TaskOutput::new(name, "d", "e", "agent", raw, at, at)
    }

    #[test]
    fn test_outputs_follow_tasks() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let result = RunResult::new(
            Uuid::new_v4(),
            "EV Growth in India",
            timestamp,
            vec![output("market_research", "M"), output("strategy", "S")],
        );
        assert_eq!(result.output("market_research"), Some("M"));
        assert_eq!(result.output("tech_analysis"), None);
        assert_eq!(result.final_output(), Some("S"));
        assert_eq!(result.formatted_timestamp(), "2024-03-01 09:05:07");
        assert_eq!(result.to_string(), "S");
    }

    #[test]
    fn test_json_shape() {
        let result = RunResult::new(Uuid::nil(), "EVs", Utc::now(), vec![output("strategy", "S")]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["topic"], "EVs");
        assert_eq!(value["outputs"]["strategy"], "S");
        assert_eq!(value["tasks_output"][0]["name"], "strategy");

        let back: RunResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
