//! Base LLM abstraction.
//!
//! Agents that reason with a language model (see
//! [`ReactExecutor`](crate::agents::ReactExecutor)) talk to it through the
//! [`BaseLLM`] trait. Providers implement a single async `call` that turns a
//! conversation into the assistant's next message.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of an [`LLMMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: Role,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors returned by LLM providers.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No API key was configured for the provider.
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Retries were exhausted on rate limits or server errors.
    #[error("giving up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Language model backend.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Provider name, for logging.
    fn provider(&self) -> &str {
        "unknown"
    }

    /// Send the conversation and return the assistant's reply text.
    ///
    /// `stop` lists sequences at which generation must end; providers apply
    /// them server-side when supported and always truncate client-side.
    async fn call(&self, messages: &[LLMMessage], stop: &[String]) -> Result<String, LLMError>;
}

/// Truncate `content` at the earliest occurrence of any stop sequence.
pub fn apply_stop_words(content: &str, stop: &[String]) -> String {
    let earliest = stop
        .iter()
        .filter(|word| !word.is_empty())
        .filter_map(|word| content.find(word.as_str()))
        .min();

    match earliest {
        Some(pos) => {
            log::debug!("Truncated LLM response at stop sequence (position {})", pos);
            content[..pos].trim_end().to_string()
        }
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_stop_words_uses_earliest_match() {
        let stop = vec!["\nObservation:".to_string(), "STOP".to_string()];
        let content = "Action: search\nAction Input: evs\nObservation: made up STOP";
        assert_eq!(apply_stop_words(content, &stop), "Action: search\nAction Input: evs");
    }

    #[test]
    fn test_apply_stop_words_without_match() {
        let stop = vec!["\nObservation:".to_string()];
        assert_eq!(apply_stop_words("Final Answer: 42", &stop), "Final Answer: 42");
        assert_eq!(apply_stop_words("text", &[]), "text");
    }

    #[test]
    fn test_message_serialization() {
        let msg = LLMMessage::assistant("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
