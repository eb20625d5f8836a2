//! Pipeline definitions: which tasks run, in which order, by which agents.
//!
//! A [`PipelineDefinition`] is topic-independent. It is built in code (see
//! [`PipelineDefinition::ev_market_research`]) or loaded from YAML, and
//! turned into concrete [`TaskSpec`](crate::TaskSpec)s by
//! [`Orchestrator::build`](crate::Orchestrator::build).

pub mod definition;
pub mod ev_research;
pub mod yaml;

pub use definition::{PipelineDefinition, TaskDefinition};
pub use ev_research::{section_title, MARKET_RESEARCH, SECTIONS, STRATEGY, TECH_ANALYSIS};
