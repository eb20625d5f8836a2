//! Agent personas.
//!
//! An [`Agent`] is an immutable descriptor: who the agent is (role, goal,
//! backstory) and which tools it may call. Turning a prompt into an answer is
//! the job of an [`AgentExecutor`](crate::agents::AgentExecutor).

pub mod core;

pub use self::core::{Agent, ToolFailurePolicy};
