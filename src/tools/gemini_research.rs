//! Long-form research and analysis through Gemini.

use async_trait::async_trait;

use super::base_tool::{BaseTool, ToolError};
use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::llms::providers::gemini::GeminiCompletion;

/// Conducts detailed analysis by sending the query to Gemini as a single
/// user turn.
#[derive(Debug, Clone)]
pub struct GeminiResearchTool {
    llm: GeminiCompletion,
}

impl GeminiResearchTool {
    pub fn new(llm: GeminiCompletion) -> Self {
        Self { llm }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }
}

#[async_trait]
impl BaseTool for GeminiResearchTool {
    fn name(&self) -> &str {
        "Gemini Research"
    }

    fn description(&self) -> &str {
        "Conduct detailed analysis using Gemini"
    }

    async fn run(&self, query: &str) -> Result<String, ToolError> {
        let text = self
            .llm
            .call(&[LLMMessage::user(query)], &[])
            .await
            .map_err(|e| ToolError::Backend(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ToolError::MalformedResponse("Gemini returned no text".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolAdapter, ToolOutput};

    #[tokio::test]
    async fn test_missing_key_degrades_to_failure_output() {
        let adapter = ToolAdapter::from(GeminiResearchTool::new(GeminiCompletion::new(
            "gemini-1.5-pro",
            None,
        )));
        match adapter.invoke("battery roadmap").await {
            ToolOutput::Failure { tool, detail } => {
                assert_eq!(tool, "Gemini Research");
                assert!(detail.contains("GEMINI_API_KEY"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_detail_never_contains_key() {
        let mut llm = GeminiCompletion::new("gemini-1.5-pro", Some("SECRETKEY123".into()))
            .with_base_url("http://127.0.0.1:9");
        llm.max_retries = 0;
        let adapter = ToolAdapter::from(GeminiResearchTool::new(llm));

        let output = adapter.invoke("battery roadmap").await;
        assert!(!output.is_success());
        assert!(!output.to_string().contains("SECRETKEY123"));
    }
}
