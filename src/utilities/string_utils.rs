//! String helpers for prompt templates and tool names.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").expect("valid variable regex"));
static CAMEL_LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel-case regex"));
static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid character-class regex"));

/// Longest tool key accepted by LLM function-calling APIs.
const MAX_TOOL_KEY_LENGTH: usize = 64;

/// Error raised when a template references an input that was not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template variable '{0}' not found in inputs")]
    MissingVariable(String),
}

/// Normalize a tool name into a stable lookup key.
///
/// `"Tavily Search"`, `"TavilySearch"` and `"tavily_search"` all map to
/// `"tavily_search"`, so registries and ReAct action names can refer to the
/// same tool in whichever spelling an author or a model prefers.
pub fn tool_key(name: &str) -> String {
    let ascii: String = name.chars().filter(|c| c.is_ascii()).collect();
    let split = CAMEL_LOWER_UPPER.replace_all(&ascii, "${1}_${2}");
    let lowered = split.to_lowercase();
    let replaced = DISALLOWED_CHARS.replace_all(&lowered, "_");
    let key = replaced.trim_matches('_');

    if key.len() > MAX_TOOL_KEY_LENGTH {
        key[..MAX_TOOL_KEY_LENGTH].trim_end_matches('_').to_string()
    } else {
        key.to_string()
    }
}

/// Replace `{variable}` placeholders with values from `inputs`.
///
/// Only identifier-shaped placeholders are touched, so literal JSON such as
/// `{"a": 1}` passes through unchanged. Every placeholder must have a value.
pub fn interpolate(template: &str, inputs: &HashMap<String, String>) -> Result<String, TemplateError> {
    if !template.contains('{') {
        return Ok(template.to_string());
    }

    if let Some(missing) = VARIABLE_PATTERN
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .find(|var| !inputs.contains_key(var))
    {
        return Err(TemplateError::MissingVariable(missing));
    }

    let result = VARIABLE_PATTERN.replace_all(template, |cap: &regex::Captures<'_>| {
        inputs.get(&cap[1]).cloned().unwrap_or_default()
    });
    Ok(result.into_owned())
}
