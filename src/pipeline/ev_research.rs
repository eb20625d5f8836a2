//! The EV market research crew: market research, then technology analysis,
//! then strategy.

use std::sync::Arc;

use super::definition::{PipelineDefinition, TaskDefinition};
use crate::agent::Agent;
use crate::errors::ConfigurationError;
use crate::tools::registry::{RESEARCH, WEB_SEARCH};
use crate::tools::{ToolAdapter, ToolRegistry};

pub const MARKET_RESEARCH: &str = "market_research";
pub const TECH_ANALYSIS: &str = "tech_analysis";
pub const STRATEGY: &str = "strategy";

/// Report sections in the order they are produced.
pub const SECTIONS: [&str; 3] = [MARKET_RESEARCH, TECH_ANALYSIS, STRATEGY];

/// Heading of a report section.
pub fn section_title(name: &str) -> &str {
    match name {
        MARKET_RESEARCH => "Market Research Report",
        TECH_ANALYSIS => "Technology Analysis",
        STRATEGY => "Strategic Recommendations",
        other => other,
    }
}

const MARKET_RESEARCH_DESCRIPTION: &str = "\
Conduct comprehensive market research on the EV industry focused on: {topic}.
- Market size, growth projections
- Key players, market share
- Regional dynamics, consumer trends
- Regulations, incentives, pricing, supply chain
Provide structured report with data.";

const TECH_ANALYSIS_DESCRIPTION: &str = "\
Analyze EV tech trends related to: {topic}.
- Battery roadmap, charging standards
- Manufacturing innovations
- Tech breakthroughs and performance metrics
- Sustainability and future projections";

const STRATEGY_DESCRIPTION: &str = "\
Create strategic insights around {topic}:
- Market opportunities, risks, differentiators
- Regional growth suggestions
- Partnerships, KPIs, investment timelines
- Actionable recommendations";

impl PipelineDefinition {
    /// The EV research crew with tools from `registry`.
    pub fn ev_market_research(registry: &ToolRegistry) -> Result<Self, ConfigurationError> {
        let web_search = registry
            .get(WEB_SEARCH)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownTool(WEB_SEARCH.to_string()))?;
        let research = registry
            .get(RESEARCH)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownTool(RESEARCH.to_string()))?;
        Ok(Self::ev_market_research_with(web_search, research))
    }

    /// The EV research crew with explicit tools. The market researcher gets
    /// both; the analysts only get `research`.
    pub fn ev_market_research_with(web_search: ToolAdapter, research: ToolAdapter) -> Self {
        let market_researcher = Agent::new(
            "Market Research Specialist",
            "Gather comprehensive market data about the EV industry",
            "You are an expert in market trends and competitive landscapes in the EV sector.",
        )
        .with_tools(vec![web_search, research.clone()])
        .with_delegation(true);

        let tech_analyst = Agent::new(
            "Technology Analyst",
            "Analyze technological developments in the EV space",
            "You specialize in EV battery tech, infrastructure, and innovations.",
        )
        .with_tool(research.clone())
        .with_delegation(true);

        let strategist = Agent::new(
            "Strategic Insights Analyst",
            "Synthesize research into actionable market insights",
            "You identify opportunities, risks, and strategic moves in the EV industry.",
        )
        .with_tool(research)
        .with_delegation(true);

        Self::new()
            .with_task(TaskDefinition::new(
                MARKET_RESEARCH,
                MARKET_RESEARCH_DESCRIPTION,
                "Detailed market research report",
                Arc::new(market_researcher),
            ))
            .with_task(
                TaskDefinition::new(
                    TECH_ANALYSIS,
                    TECH_ANALYSIS_DESCRIPTION,
                    "Technical analysis report",
                    Arc::new(tech_analyst),
                )
                .with_context([MARKET_RESEARCH]),
            )
            .with_task(
                TaskDefinition::new(
                    STRATEGY,
                    STRATEGY_DESCRIPTION,
                    "Strategic recommendations report",
                    Arc::new(strategist),
                )
                .with_context([MARKET_RESEARCH, TECH_ANALYSIS]),
            )
    }
}
