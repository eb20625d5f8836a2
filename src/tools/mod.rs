//! Tool adapters: the external capabilities agents call.
//!
//! - [`base_tool`] - the [`BaseTool`] contract and closure-backed [`Tool`]
//! - [`tool_adapter`] - the closed [`ToolAdapter`] enum and [`ToolOutput`]
//! - [`tavily_search`] / [`gemini_research`] - HTTP backends
//! - [`registry`] - name-based lookup used by pipeline definitions

pub mod base_tool;
pub mod gemini_research;
pub mod registry;
pub mod tavily_search;
pub mod tool_adapter;

pub use base_tool::{BaseTool, Tool, ToolError};
pub use gemini_research::GeminiResearchTool;
pub use registry::ToolRegistry;
pub use tavily_search::TavilySearchTool;
pub use tool_adapter::{ToolAdapter, ToolOutput, ERROR_MARKER};
