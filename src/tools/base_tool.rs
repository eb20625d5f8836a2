//! Base tool definitions.
//!
//! [`BaseTool`] is the contract every concrete capability implements: a name,
//! a description for the model, and an async `run` that maps a query to text.
//! [`Tool`] wraps a plain closure and is the way to plug in capabilities that
//! need no HTTP backend (and fakes in tests).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Failure inside a tool backend.
///
/// Never crosses the [`ToolAdapter`](super::ToolAdapter) boundary as an
/// error; adapters turn it into [`ToolOutput::Failure`](super::ToolOutput).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Backend(String),
}

impl ToolError {
    /// Convenience constructor for closure-backed tools.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// A single external capability.
#[async_trait]
pub trait BaseTool: Send + Sync + fmt::Debug {
    /// Unique name of the tool within an agent's tool set.
    fn name(&self) -> &str;

    /// Tells the model when and how to use the tool.
    fn description(&self) -> &str;

    /// Run the tool for `query`.
    async fn run(&self, query: &str) -> Result<String, ToolError>;
}

/// Synchronous function backing a [`Tool`].
pub type ToolFn = Arc<dyn Fn(&str) -> Result<String, ToolError> + Send + Sync>;

/// Tool that wraps a callable.
#[derive(Clone)]
pub struct Tool {
    tool_name: String,
    tool_description: String,
    func: ToolFn,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.tool_name)
            .field("description", &self.tool_description)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: description.into(),
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl BaseTool for Tool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.tool_description
    }

    async fn run(&self, query: &str) -> Result<String, ToolError> {
        (self.func)(query)
    }
}
