//! The closed set of tool capabilities an agent can hold.

use std::fmt;

use super::base_tool::{BaseTool, Tool, ToolError};
use super::gemini_research::GeminiResearchTool;
use super::tavily_search::TavilySearchTool;

/// Prefix of the rendered text of a failed tool call.
pub const ERROR_MARKER: &str = "Error in";

/// Result of invoking a [`ToolAdapter`].
///
/// A degraded answer and a crash are different values: callers match on the
/// variant instead of searching the text for an error marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// The backend produced text.
    Success(String),
    /// The backend failed; `detail` describes why.
    Failure { tool: String, detail: String },
}

impl ToolOutput {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Text to show a user or feed back to a model.
    ///
    /// Failures render as `Error in <tool>: <detail>`.
    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) => text,
            failure => failure.to_string(),
        }
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => f.write_str(text),
            Self::Failure { tool, detail } => write!(f, "{} {}: {}", ERROR_MARKER, tool, detail),
        }
    }
}

/// An external capability bound to an agent.
///
/// Adapters are stateless and cheap to clone; the same adapter may be shared
/// by several agents and reused across tasks and runs.
#[derive(Debug, Clone)]
pub enum ToolAdapter {
    /// Web search through the Tavily API.
    TavilySearch(TavilySearchTool),
    /// Long-form research and analysis through Gemini.
    GeminiResearch(GeminiResearchTool),
    /// Any closure-backed capability.
    Function(Tool),
}

impl ToolAdapter {
    /// Build a [`ToolAdapter::Function`] from a closure.
    pub fn function<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::Function(Tool::new(name, description, func))
    }

    fn as_tool(&self) -> &dyn BaseTool {
        match self {
            Self::TavilySearch(tool) => tool,
            Self::GeminiResearch(tool) => tool,
            Self::Function(tool) => tool,
        }
    }

    pub fn name(&self) -> &str {
        self.as_tool().name()
    }

    pub fn description(&self) -> &str {
        self.as_tool().description()
    }

    /// Run the tool. Never fails: backend errors come back as
    /// [`ToolOutput::Failure`].
    pub async fn invoke(&self, query: &str) -> ToolOutput {
        let tool = self.as_tool();
        if query.trim().is_empty() {
            return ToolOutput::Failure {
                tool: tool.name().to_string(),
                detail: ToolError::EmptyQuery.to_string(),
            };
        }

        log::debug!("Tool call: {} ({} chars of input)", tool.name(), query.len());
        match tool.run(query).await {
            Ok(text) => ToolOutput::Success(text),
            Err(e) => {
                log::warn!("Tool '{}' failed: {}", tool.name(), e);
                ToolOutput::Failure {
                    tool: tool.name().to_string(),
                    detail: e.to_string(),
                }
            }
        }
    }
}

impl From<Tool> for ToolAdapter {
    fn from(tool: Tool) -> Self {
        Self::Function(tool)
    }
}

impl From<TavilySearchTool> for ToolAdapter {
    fn from(tool: TavilySearchTool) -> Self {
        Self::TavilySearch(tool)
    }
}

impl From<GeminiResearchTool> for ToolAdapter {
    fn from(tool: GeminiResearchTool) -> Self {
        Self::GeminiResearch(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn echo() -> ToolAdapter {
        ToolAdapter::function("Echo", "Echoes the query", |q: &str| Ok(format!("RESULT:{}", q)))
    }

    #[tokio::test]
    async fn test_invoke_success() {
        assert_eq!(
            echo().invoke("EV Growth in India").await,
            ToolOutput::Success("RESULT:EV Growth in India".to_string())
        );
    }

    #[tokio::test]
    async fn test_invoke_is_idempotent_for_fixed_query() {
        let tool = echo();
        let first = tool.invoke("charging standards").await;
        let second = tool.invoke("charging standards").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invoke_converts_error_to_failure() {
        let tool = ToolAdapter::function("Gemini Research", "fails", |_: &str| {
            Err(ToolError::backend("quota exceeded"))
        });
        let output = tool.invoke("battery tech").await;
        assert!(!output.is_success());
        assert_eq!(output.to_string(), "Error in Gemini Research: quota exceeded");
        assert!(output.into_text().starts_with(ERROR_MARKER));
    }

    #[tokio::test]
    async fn test_blank_query_never_reaches_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let tool = ToolAdapter::function("Counter", "counts", move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        });
        let output = tool.invoke("   ").await;
        assert!(matches!(output, ToolOutput::Failure { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
