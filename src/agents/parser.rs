//! Parser for ReAct-style LLM responses.
//!
//! Turns model output into either an [`AgentStep::Action`] (call a tool) or
//! an [`AgentStep::Finish`] (final answer).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The text prefix for a final answer.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const MISSING_ACTION_AFTER_THOUGHT_ERROR_MESSAGE: &str =
    "I just got this: I couldn't find an Action after the Thought.";

const MISSING_ACTION_INPUT_AFTER_ACTION_ERROR_MESSAGE: &str =
    "I just got this: I found an Action but couldn't find a valid Action Input right after it.";

static ACTION_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:\s*(.+?)\s*(?:\n|\r\n?)Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)")
        .expect("valid action regex")
});
static ACTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Action\s*\d*\s*:").expect("valid action regex"));
static ACTION_INPUT_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("valid action input regex"));

// ---------------------------------------------------------------------------
// Parse result
// ---------------------------------------------------------------------------

/// One parsed step of the ReAct loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// The model wants to call `tool` with `tool_input`.
    Action {
        thought: String,
        tool: String,
        tool_input: String,
    },
    /// The model has a final answer.
    Finish { thought: String, output: String },
}

/// Raised when model output follows neither format. The message is written
/// for the model and is fed back as an observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OutputParserError {
    pub message: String,
}

impl OutputParserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse agent output text.
///
/// **Action format**:
/// ```text
/// Thought: I need market data
/// Action: Tavily Search
/// Action Input: EV sales India 2024
/// ```
///
/// **Final answer format**:
/// ```text
/// Thought: I have enough
/// Final Answer: India's EV market ...
/// ```
///
/// When both appear, the final answer wins.
pub fn parse(text: &str) -> Result<AgentStep, OutputParserError> {
    let thought = extract_thought(text);

    if let Some(idx) = text.rfind(FINAL_ANSWER_ACTION) {
        let answer = text[idx + FINAL_ANSWER_ACTION.len()..].trim();
        return Ok(AgentStep::Finish {
            thought,
            output: clean_trailing_backticks(answer),
        });
    }

    if let Some(caps) = ACTION_INPUT_RE.captures(text) {
        let tool = clean_action(caps.get(1).map_or("", |m| m.as_str()));
        let tool_input = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_matches('"')
            .to_string();
        return Ok(AgentStep::Action {
            thought,
            tool,
            tool_input,
        });
    }

    if !ACTION_RE.is_match(text) {
        return Err(OutputParserError::new(format!(
            "{}\nYou MUST use the following format:\n\
             Thought: [your thought]\n\
             Final Answer: [your final answer]",
            MISSING_ACTION_AFTER_THOUGHT_ERROR_MESSAGE
        )));
    }

    if !ACTION_INPUT_ONLY_RE.is_match(text) {
        return Err(OutputParserError::new(MISSING_ACTION_INPUT_AFTER_ACTION_ERROR_MESSAGE));
    }

    Err(OutputParserError::new(
        "Could not parse the output. Please use the correct format.",
    ))
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn extract_thought(text: &str) -> String {
    let thought_index = text.find("\nAction").or_else(|| text.find("\nFinal Answer"));
    match thought_index {
        Some(idx) => text[..idx].replace("```", "").trim().to_string(),
        None => String::new(),
    }
}

/// Strip markdown emphasis models like to put around tool names.
fn clean_action(text: &str) -> String {
    text.trim().trim_matches('*').trim().to_string()
}

/// Drop an unmatched trailing code fence.
fn clean_trailing_backticks(text: &str) -> String {
    if text.ends_with("```") && text.matches("```").count() % 2 != 0 {
        text[..text.len() - 3].trim_end().to_string()
    } else {
        text.to_string()
    }
}
