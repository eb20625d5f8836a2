//! Runtime settings for the research crew.
//!
//! Backend credentials and knobs come from the process environment, after
//! an optional `.env` file has been loaded. The orchestrator itself never
//! reads configuration; it receives already-built tools and executors.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Default Gemini model used for research and ReAct reasoning.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
/// Default per-task tool-call budget for agents allowed to delegate.
pub const DEFAULT_MAX_ITER: usize = 25;
/// Default HTTP port of the research server.
pub const DEFAULT_PORT: u16 = 8080;

/// How agents turn a composed prompt into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// LLM-driven ReAct loop over the agent's tools.
    React,
    /// Invoke the agent's tools directly with the prompt, no LLM in between.
    Tools,
}

impl std::str::FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "react" => Ok(Self::React),
            "tools" | "tool_chain" | "tool-chain" => Ok(Self::Tools),
            other => Err(format!("unknown executor '{}'", other)),
        }
    }
}

/// Settings for backends, agents and the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Gemini API key (`GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`).
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    /// Gemini model name (`GEMINI_MODEL`).
    pub gemini_model: String,
    /// Tavily API key (`TAVILY_API_KEY`).
    #[serde(skip_serializing)]
    pub tavily_api_key: Option<String>,
    /// Tool-call budget for delegating agents (`CREW_MAX_ITER`).
    pub max_iter: usize,
    /// Print agent progress to the console (`CREW_VERBOSE`).
    pub verbose: bool,
    /// Agent executor (`CREW_EXECUTOR`); defaults to ReAct when a Gemini key is set.
    pub executor: ExecutorKind,
    /// HTTP port (`PORT`).
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            tavily_api_key: None,
            max_iter: DEFAULT_MAX_ITER,
            verbose: false,
            executor: ExecutorKind::Tools,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply the process-wide agent settings to `agent`.
    pub fn configure_agent(&self, agent: Agent) -> Agent {
        agent.with_verbose(self.verbose).with_max_iter(self.max_iter)
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Unparseable numeric or enum values fall back to their defaults with a
    /// warning instead of failing startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"));

        let executor = match non_empty("CREW_EXECUTOR") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                log::warn!("{}; falling back to the tool-chain executor", e);
                ExecutorKind::Tools
            }),
            None if gemini_api_key.is_some() => ExecutorKind::React,
            None => ExecutorKind::Tools,
        };

        Self {
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            tavily_api_key: non_empty("TAVILY_API_KEY"),
            max_iter: parse_or(non_empty("CREW_MAX_ITER"), "CREW_MAX_ITER", defaults.max_iter),
            verbose: non_empty("CREW_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.verbose),
            port: parse_or(non_empty("PORT"), "PORT", defaults.port),
            gemini_api_key,
            executor,
        }
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}='{}'", key, value);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(settings.max_iter, DEFAULT_MAX_ITER);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.executor, ExecutorKind::Tools);
        assert!(settings.gemini_api_key.is_none());
    }

    #[test]
    fn test_google_key_fallback_selects_react() {
        let settings = Settings::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g-key")]));
        assert_eq!(settings.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(settings.executor, ExecutorKind::React);
    }

    #[test]
    fn test_explicit_values_and_invalid_numbers() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("CREW_EXECUTOR", "tools"),
            ("CREW_MAX_ITER", "not-a-number"),
            ("CREW_VERBOSE", "true"),
            ("PORT", "9090"),
        ]));
        assert_eq!(settings.executor, ExecutorKind::Tools);
        assert_eq!(settings.max_iter, DEFAULT_MAX_ITER);
        assert!(settings.verbose);
        assert_eq!(settings.bind_addr(), "0.0.0.0:9090");
    }

    #[test]
    fn test_api_keys_are_not_serialized() {
        let settings = Settings::from_lookup(lookup_from(&[("TAVILY_API_KEY", "secret")]));
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }
}
