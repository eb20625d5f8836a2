//! Name-keyed registry of tool adapters.
//!
//! Pipeline definitions refer to tools by name; the registry resolves those
//! names to adapters at build time. Lookups are spelling-insensitive through
//! [`tool_key`], so `"Tavily Search"` and `"tavily_search"` are the same tool.

use std::collections::BTreeMap;

use super::gemini_research::GeminiResearchTool;
use super::tavily_search::TavilySearchTool;
use super::tool_adapter::ToolAdapter;
use crate::config::Settings;
use crate::errors::ConfigurationError;
use crate::llms::providers::gemini::GeminiCompletion;
use crate::utilities::string_utils::tool_key;

/// Registry key of the web search tool.
pub const WEB_SEARCH: &str = "tavily_search";
/// Registry key of the research tool.
pub const RESEARCH: &str = "gemini_research";

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolAdapter>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Tavily search and Gemini research backends.
    ///
    /// Missing credentials do not prevent registration; the tools report the
    /// missing key as a failed call when invoked.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(TavilySearchTool::new(settings.tavily_api_key.clone()).into());
        registry.register(
            GeminiResearchTool::new(GeminiCompletion::new(
                settings.gemini_model.clone(),
                settings.gemini_api_key.clone(),
            ))
            .into(),
        );
        registry
    }

    /// Add (or replace) a tool under its normalized name.
    pub fn register(&mut self, tool: ToolAdapter) {
        let key = tool_key(tool.name());
        if self.tools.insert(key.clone(), tool).is_some() {
            log::debug!("Replaced tool '{}' in registry", key);
        }
    }

    pub fn with_tool(mut self, tool: ToolAdapter) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolAdapter> {
        self.tools.get(&tool_key(name))
    }

    /// Resolve tool names in order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ToolAdapter>, ConfigurationError> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| ConfigurationError::UnknownTool(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Registered keys, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
