//! Google Gemini completion provider.
//!
//! Talks to the `generateContent` REST endpoint of the Gemini API. System
//! messages become the `systemInstruction`, assistant turns use the `model`
//! role, and stop sequences are forwarded in the generation config.
//!
//! # Authentication
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL, and
//! transport errors are stripped of their URL before they are reported.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llms::base_llm::{apply_stop_words, BaseLLM, LLMError, LLMMessage, Role};

/// Default API root.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini completion client.
#[derive(Debug, Clone)]
pub struct GeminiCompletion {
    model: String,
    api_key: Option<String>,
    base_url: String,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Upper bound on generated tokens.
    pub max_output_tokens: Option<u32>,
    /// Retries on 429 and 5xx responses, with exponential backoff.
    pub max_retries: u32,
    client: reqwest::Client,
}

impl GeminiCompletion {
    /// Create a client for `model` with an explicit API key.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            model: model.into(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            temperature: None,
            max_output_tokens: None,
            max_retries: 2,
            client,
        }
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request(&self, api_key: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(body)
    }

    fn generation_config(&self, stop: &[String]) -> Value {
        let mut config = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_output_tokens {
            config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !stop.is_empty() {
            config.insert("stopSequences".to_string(), json!(stop));
        }
        Value::Object(config)
    }

    /// Split messages into the system instruction and Gemini `contents`.
    fn format_messages(messages: &[LLMMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.as_str()),
                Role::User => contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": msg.content }],
                })),
                Role::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": [{ "text": msg.content }],
                })),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };
        (system, contents)
    }

    fn build_request_body(&self, messages: &[LLMMessage], stop: &[String]) -> Value {
        let (system, contents) = Self::format_messages(messages);
        let mut body = json!({
            "contents": contents,
            "generationConfig": self.generation_config(stop),
        });
        if let Some(system_text) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system_text }] });
        }
        body
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(response: &Value) -> Result<String, LLMError> {
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown Gemini API error");
            return Err(LLMError::MalformedResponse(message.to_string()));
        }

        let parts = response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.pointer("/content/parts"))
            .and_then(Value::as_array)
            .ok_or_else(|| LLMError::MalformedResponse("no candidate content in Gemini response".into()))?;

        Ok(parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl BaseLLM for GeminiCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    async fn call(&self, messages: &[LLMMessage], stop: &[String]) -> Result<String, LLMError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LLMError::MissingApiKey("GEMINI_API_KEY"))?;

        log::debug!(
            "GeminiCompletion.call: model={}, messages={}",
            self.model,
            messages.len()
        );

        let body = self.build_request_body(messages, stop);

        let mut retry_delay = Duration::from_secs(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("Gemini API retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self.request(api_key, &body).send().await {
                Ok(resp) => resp,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_error = e.without_url().to_string();
                    continue;
                }
                Err(e) => return Err(e.without_url().into()),
            };

            let status = response.status();
            let text = response.text().await.map_err(reqwest::Error::without_url)?;

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                last_error = format!("status {}", status);
                continue;
            }
            if !status.is_success() {
                return Err(LLMError::Api {
                    provider: "gemini",
                    status: status.as_u16(),
                    body: text,
                });
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                LLMError::MalformedResponse(format!(
                    "{} - body: {}",
                    e,
                    text.chars().take(500).collect::<String>()
                ))
            })?;
            let content = Self::parse_response(&json)?;
            return Ok(apply_stop_words(&content, stop));
        }

        Err(LLMError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_messages_splits_system() {
        let messages = vec![
            LLMMessage::system("You are a Technology Analyst."),
            LLMMessage::user("Analyze battery roadmaps"),
            LLMMessage::assistant("Thought: I should search"),
        ];
        let (system, contents) = GeminiCompletion::format_messages(&messages);
        assert_eq!(system.as_deref(), Some("You are a Technology Analyst."));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Thought: I should search");
    }

    #[test]
    fn test_request_body_includes_stop_sequences() {
        let llm = GeminiCompletion::new("gemini-1.5-pro", Some("k".into())).with_temperature(0.2);
        let stop = vec!["\nObservation:".to_string()];
        let body = llm.build_request_body(&[LLMMessage::user("hi")], &stop);
        assert_eq!(body["generationConfig"]["stopSequences"][0], "\nObservation:");
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_response_joins_text_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "EV sales " }, { "text": "grew 40%." }] }
            }]
        });
        assert_eq!(
            GeminiCompletion::parse_response(&response).unwrap(),
            "EV sales grew 40%."
        );
    }

    #[test]
    fn test_parse_response_errors() {
        let api_error = json!({ "error": { "message": "quota exceeded" } });
        let err = GeminiCompletion::parse_response(&api_error).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));

        let empty = json!({ "candidates": [] });
        assert!(GeminiCompletion::parse_response(&empty).is_err());
    }

    #[tokio::test]
    async fn test_call_without_key_fails_fast() {
        let llm = GeminiCompletion::new("gemini-1.5-pro", None);
        let err = llm.call(&[LLMMessage::user("hi")], &[]).await.unwrap_err();
        assert!(matches!(err, LLMError::MissingApiKey(_)));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        let mut llm = GeminiCompletion::new("gemini-1.5-pro", Some("SECRETKEY123".into()))
            .with_base_url("http://127.0.0.1:9");
        llm.max_retries = 0;

        let err = llm.call(&[LLMMessage::user("hi")], &[]).await.unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("SECRETKEY123"), "{}", message);
    }

    #[test]
    fn test_key_sent_as_header_not_query() {
        let llm = GeminiCompletion::new("gemini-1.5-pro", Some("SECRETKEY123".into()));
        let body = llm.build_request_body(&[LLMMessage::user("hi")], &[]);
        let request = llm.request("SECRETKEY123", &body).build().unwrap();
        assert!(request.url().query().is_none());
        assert_eq!(request.headers()[API_KEY_HEADER], "SECRETKEY123");
    }

    #[test]
    fn test_endpoint_uses_base_url() {
        let llm = GeminiCompletion::new("gemini-1.5-flash", None).with_base_url("http://localhost:9/");
        assert_eq!(
            llm.endpoint(),
            "http://localhost:9/models/gemini-1.5-flash:generateContent"
        );
    }
}
