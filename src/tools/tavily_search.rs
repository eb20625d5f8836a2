//! Web search through the Tavily API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::base_tool::{BaseTool, ToolError};

/// Tavily search endpoint.
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Searches the internet for information using Tavily.
#[derive(Debug, Clone)]
pub struct TavilySearchTool {
    api_key: Option<String>,
    endpoint: String,
    max_results: u32,
    client: reqwest::Client,
}

impl TavilySearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            api_key,
            endpoint: TAVILY_SEARCH_URL.to_string(),
            max_results: 5,
            client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    fn format_results(query: &str, response: &SearchResponse) -> String {
        let mut sections = Vec::new();
        if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
            sections.push(format!("Summary: {}", answer.trim()));
        }
        for (i, hit) in response.results.iter().enumerate() {
            sections.push(format!(
                "{}. {}\n   {}\n   {}",
                i + 1,
                hit.title.trim(),
                hit.url.trim(),
                hit.content.trim()
            ));
        }

        if sections.is_empty() {
            format!("No search results found for: {}", query)
        } else {
            format!("Search results for: {}\n\n{}", query, sections.join("\n\n"))
        }
    }
}

#[async_trait]
impl BaseTool for TavilySearchTool {
    fn name(&self) -> &str {
        "Tavily Search"
    }

    fn description(&self) -> &str {
        "Search the internet for information using Tavily"
    }

    async fn run(&self, query: &str) -> Result<String, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential("TAVILY_API_KEY"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "api_key": api_key,
                "query": query,
                "max_results": self.max_results,
                "include_answer": true,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ToolError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ToolError::MalformedResponse(e.to_string()))?;
        Ok(Self::format_results(query, &parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolAdapter, ToolOutput};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/search", addr)
    }

    #[test]
    fn test_format_results() {
        let response: SearchResponse = serde_json::from_value(json!({
            "answer": "India's EV market is growing fast.",
            "results": [
                { "title": "EV sales 2024", "url": "https://example.com/a", "content": "Sales doubled." },
                { "title": "Charging", "url": "https://example.com/b", "content": "12k stations." }
            ]
        }))
        .unwrap();
        let text = TavilySearchTool::format_results("EV Growth in India", &response);
        assert!(text.starts_with("Search results for: EV Growth in India"));
        assert!(text.contains("Summary: India's EV market is growing fast."));
        assert!(text.contains("1. EV sales 2024\n   https://example.com/a\n   Sales doubled."));
        assert!(text.contains("2. Charging"));
    }

    #[test]
    fn test_format_empty_results() {
        let response: SearchResponse = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert_eq!(
            TavilySearchTool::format_results("nothing", &response),
            "No search results found for: nothing"
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let err = TavilySearchTool::new(None).run("evs").await.unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential("TAVILY_API_KEY")));
    }

    #[tokio::test]
    async fn test_search_against_local_backend() {
        let router = Router::new().route(
            "/search",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "answer": format!("max_results={}", body["max_results"]),
                    "results": [{ "title": body["query"], "url": "https://example.com", "content": "ok" }]
                }))
            }),
        );
        let tool = TavilySearchTool::new(Some("k".into()))
            .with_endpoint(serve(router).await)
            .with_max_results(3);

        match ToolAdapter::from(tool).invoke("EV Growth in India").await {
            ToolOutput::Success(text) => {
                assert!(text.contains("Summary: max_results=3"));
                assert!(text.contains("1. EV Growth in India"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_becomes_failure() {
        let router = Router::new().route(
            "/search",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let tool = TavilySearchTool::new(Some("k".into())).with_endpoint(serve(router).await);

        match ToolAdapter::from(tool).invoke("evs").await {
            ToolOutput::Failure { tool, detail } => {
                assert_eq!(tool, "Tavily Search");
                assert_eq!(detail, "backend returned 429: quota exceeded");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_failure() {
        let router = Router::new().route("/search", post(|| async { "not json" }));
        let tool = TavilySearchTool::new(Some("k".into())).with_endpoint(serve(router).await);

        match ToolAdapter::from(tool).invoke("evs").await {
            ToolOutput::Failure { detail, .. } => assert!(detail.starts_with("malformed response:")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
