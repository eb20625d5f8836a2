//! Loading pipelines from `agents.yaml` / `tasks.yaml`.
//!
//! `agents.yaml` maps agent ids to personas; `tasks.yaml` maps task names to
//! task templates, in execution order:
//!
//! ```yaml
//! # agents.yaml
//! market_research:
//!   role: Market Research Specialist
//!   goal: Gather comprehensive market data about the EV industry
//!   backstory: You are an expert in market trends.
//!   tools: [tavily_search, gemini_research]
//!   allow_delegation: true
//!
//! # tasks.yaml
//! market_research:
//!   description: Conduct market research on {topic}.
//!   expected_output: Detailed market research report
//!   agent: market_research
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::definition::{PipelineDefinition, TaskDefinition};
use crate::agent::{Agent, ToolFailurePolicy};
use crate::config::Settings;
use crate::errors::ConfigurationError;
use crate::tools::ToolRegistry;

pub const AGENTS_FILE: &str = "agents.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

#[derive(Debug, Deserialize)]
struct AgentConfig {
    role: String,
    goal: String,
    backstory: String,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    allow_delegation: bool,
    /// Falls back to `Settings::max_iter`.
    #[serde(default)]
    max_iter: Option<usize>,
    #[serde(default)]
    tool_failure_policy: ToolFailurePolicy,
    /// Falls back to `Settings::verbose`.
    #[serde(default)]
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TaskConfig {
    description: String,
    expected_output: String,
    agent: String,
    #[serde(default)]
    context: Vec<String>,
    #[serde(default)]
    markdown: bool,
}

fn invalid(source: &str, e: impl std::fmt::Display) -> ConfigurationError {
    ConfigurationError::InvalidDefinition(format!("{}: {}", source, e))
}

impl PipelineDefinition {
    /// Build a pipeline from the contents of `agents.yaml` and `tasks.yaml`.
    ///
    /// Tool names resolve through `registry`. `max_iter` and `verbose` set on
    /// an agent win over `settings`. The result is validated.
    pub fn from_yaml(
        agents_yaml: &str,
        tasks_yaml: &str,
        registry: &ToolRegistry,
        settings: &Settings,
    ) -> Result<Self, ConfigurationError> {
        let agent_configs: BTreeMap<String, AgentConfig> =
            serde_yaml::from_str(agents_yaml).map_err(|e| invalid(AGENTS_FILE, e))?;

        let mut agents = HashMap::with_capacity(agent_configs.len());
        for (id, config) in agent_configs {
            let agent = Agent::new(config.role, config.goal, config.backstory)
                .with_tools(registry.resolve(config.tools.as_slice())?)
                .with_delegation(config.allow_delegation)
                .with_max_iter(config.max_iter.unwrap_or(settings.max_iter))
                .with_tool_failure_policy(config.tool_failure_policy)
                .with_verbose(config.verbose.unwrap_or(settings.verbose));
            agents.insert(id, Arc::new(agent));
        }

        // A mapping keeps declaration order, which is execution order.
        let task_entries: serde_yaml::Mapping =
            serde_yaml::from_str(tasks_yaml).map_err(|e| invalid(TASKS_FILE, e))?;

        let mut pipeline = PipelineDefinition::new();
        for (key, value) in task_entries {
            let name = key
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(TASKS_FILE, "task names must be strings"))?;
            let config: TaskConfig =
                serde_yaml::from_value(value).map_err(|e| invalid(TASKS_FILE, format!("task '{}': {}", name, e)))?;

            let agent = agents
                .get(&config.agent)
                .cloned()
                .ok_or_else(|| ConfigurationError::UnknownAgent {
                    task: name.clone(),
                    agent: config.agent.clone(),
                })?;

            pipeline.push(
                TaskDefinition::new(name, config.description, config.expected_output, agent)
                    .with_context(config.context)
                    .with_markdown(config.markdown),
            );
        }

        pipeline.validate()?;
        log::debug!("Loaded pipeline with {} task(s) from YAML", pipeline.len());
        Ok(pipeline)
    }

    /// Load `agents.yaml` and `tasks.yaml` from `dir`.
    pub fn from_dir(
        dir: impl AsRef<Path>,
        registry: &ToolRegistry,
        settings: &Settings,
    ) -> Result<Self, ConfigurationError> {
        let dir = dir.as_ref();
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).map_err(|e| invalid(&path.display().to_string(), e))
        };
        Self::from_yaml(&read(AGENTS_FILE)?, &read(TASKS_FILE)?, registry, settings)
    }

    /// The pipeline a process runs: the YAML crew in `dir` when one is given,
    /// the built-in EV crew otherwise. Either way `settings` supplies the
    /// agent defaults.
    pub fn load(
        dir: Option<&Path>,
        registry: &ToolRegistry,
        settings: &Settings,
    ) -> Result<Self, ConfigurationError> {
        match dir {
            Some(dir) => Self::from_dir(dir, registry, settings),
            None => Ok(Self::ev_market_research(registry)?.map_agents(|agent| settings.configure_agent(agent))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_ITER;
    use crate::tools::ToolAdapter;

    const AGENTS: &str = r#"
market_research:
  role: Market Research Specialist
  goal: Gather market data on {topic}
  backstory: Expert in EV markets.
  tools: [Tavily Search, gemini_research]
  allow_delegation: true
  max_iter: 5
analyst:
  role: Technology Analyst
  goal: Analyze EV tech
  backstory: Engineer.
  tools: [gemini_research]
  tool_failure_policy: abort
"#;

    const TASKS: &str = r#"
market_research:
  description: Research {topic}
  expected_output: Market report
  agent: market_research
tech_analysis:
  description: Analyze {topic}
  expected_output: Tech report
  agent: analyst
  context: [market_research]
  markdown: true
"#;

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with_tool(ToolAdapter::function("Tavily Search", "search", |q: &str| Ok(q.to_string())))
            .with_tool(ToolAdapter::function("Gemini Research", "research", |q: &str| Ok(q.to_string())))
    }

    #[test]
    fn test_from_yaml() {
        let p = PipelineDefinition::from_yaml(AGENTS, TASKS, &registry(), &Settings::default()).unwrap();
        assert_eq!(p.len(), 2);

        let market = &p.tasks()[0];
        assert_eq!(market.name, "market_research");
        assert_eq!(market.agent.tool_names(), vec!["Tavily Search", "Gemini Research"]);
        assert_eq!(market.agent.tool_call_budget(), 5);

        let tech = &p.tasks()[1];
        assert_eq!(tech.context, vec!["market_research"]);
        assert!(tech.markdown);
        assert_eq!(tech.agent.tool_failure_policy, ToolFailurePolicy::Abort);
        assert_eq!(tech.agent.max_iter, DEFAULT_MAX_ITER);
    }

    #[test]
    fn test_unknown_references() {
        let tasks = "a:\n  description: d\n  expected_output: e\n  agent: nobody\n";
        assert_eq!(
            PipelineDefinition::from_yaml(AGENTS, tasks, &registry(), &Settings::default()).unwrap_err(),
            ConfigurationError::UnknownAgent {
                task: "a".into(),
                agent: "nobody".into()
            }
        );

        assert_eq!(
            PipelineDefinition::from_yaml(AGENTS, TASKS, &ToolRegistry::new(), &Settings::default()).unwrap_err(),
            ConfigurationError::UnknownTool("gemini_research".into())
        );
    }

    #[test]
    fn test_graph_is_validated() {
        let tasks = "a:\n  description: d\n  expected_output: e\n  agent: analyst\n  context: [b]\n\
                     b:\n  description: d\n  expected_output: e\n  agent: analyst\n";
        assert!(matches!(
            PipelineDefinition::from_yaml(AGENTS, tasks, &registry(), &Settings::default()),
            Err(ConfigurationError::ForwardReference { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = PipelineDefinition::from_yaml("market_research: [", TASKS, &registry(), &Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDefinition(msg) if msg.starts_with("agents.yaml")));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(AGENTS_FILE), AGENTS).unwrap();
        std::fs::write(dir.path().join(TASKS_FILE), TASKS).unwrap();

        let p = PipelineDefinition::from_dir(dir.path(), &registry(), &Settings::default()).unwrap();
        assert_eq!(p.tasks()[1].name, "tech_analysis");

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(
            PipelineDefinition::from_dir(empty.path(), &registry(), &Settings::default()),
            Err(ConfigurationError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_settings_fill_unset_agent_values() {
        let settings = Settings {
            max_iter: 7,
            verbose: true,
            ..Settings::default()
        };
        let p = PipelineDefinition::from_yaml(AGENTS, TASKS, &registry(), &settings).unwrap();

        let market = &p.tasks()[0].agent;
        assert_eq!(market.max_iter, 5);
        assert!(market.verbose);

        let tech = &p.tasks()[1].agent;
        assert_eq!(tech.max_iter, 7);
        assert!(tech.verbose);
    }

    #[test]
    fn test_load_without_dir_configures_builtin_crew() {
        let settings = Settings {
            max_iter: 3,
            verbose: true,
            ..Settings::default()
        };
        let p = PipelineDefinition::load(None, &registry(), &settings).unwrap();
        assert_eq!(p.len(), 3);
        assert!(p.tasks().iter().all(|t| t.agent.max_iter == 3 && t.agent.verbose));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(AGENTS_FILE), AGENTS).unwrap();
        std::fs::write(dir.path().join(TASKS_FILE), TASKS).unwrap();
        let p = PipelineDefinition::load(Some(dir.path()), &registry(), &settings).unwrap();
        assert_eq!(p.tasks()[1].agent.max_iter, 3);
    }
}
