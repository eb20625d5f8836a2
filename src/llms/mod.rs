//! Language model backends.
//!
//! - [`base_llm`] - the [`BaseLLM`] trait and message types
//! - [`providers`] - concrete providers (Gemini)

pub mod base_llm;
pub mod providers;

pub use base_llm::{apply_stop_words, BaseLLM, LLMError, LLMMessage, Role};
pub use providers::gemini::GeminiCompletion;
