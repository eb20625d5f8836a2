//! LLM provider implementations.
//!
//! Each provider implements [`BaseLLM`](crate::llms::base_llm::BaseLLM) over
//! its REST API with `reqwest`.

pub mod gemini;
