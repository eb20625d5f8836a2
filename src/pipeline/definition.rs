//! Pipeline definitions and their validation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::agent::Agent;
use crate::errors::ConfigurationError;
use crate::task::TaskSpec;
use crate::utilities::string_utils::{interpolate, TemplateError};

/// Template for one task. `description` and `expected_output` may contain
/// `{topic}`, which is filled in when the pipeline is instantiated.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub agent: Arc<Agent>,
    pub context: Vec<String>,
    pub markdown: bool,
}

impl TaskDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            context: Vec::new(),
            markdown: false,
        }
    }

    pub fn with_context<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }
}

/// Ordered list of task definitions. Declaration order is execution order.
#[derive(Debug, Clone, Default)]
pub struct PipelineDefinition {
    tasks: Vec<TaskDefinition>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl PipelineDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: TaskDefinition) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn push(&mut self, task: TaskDefinition) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn task_mut(&mut self, name: &str) -> Option<&mut TaskDefinition> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Rebuild every agent with `f`. Tasks that shared an agent still share
    /// the rebuilt one.
    pub fn map_agents<F>(mut self, f: F) -> Self
    where
        F: Fn(Agent) -> Agent,
    {
        let mut rebuilt: HashMap<Uuid, Arc<Agent>> = HashMap::new();
        for task in &mut self.tasks {
            let agent = rebuilt
                .entry(task.agent.id)
                .or_insert_with(|| Arc::new(f(task.agent.as_ref().clone())))
                .clone();
            task.agent = agent;
        }
        self
    }

    /// Check names and the dependency graph.
    ///
    /// Cycles are reported before forward references, so a self reference
    /// or a two-task loop surfaces as [`ConfigurationError::CyclicDependency`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tasks.is_empty() {
            return Err(ConfigurationError::EmptyPipeline);
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(ConfigurationError::EmptyTaskName);
            }
            if !seen.insert(task.name.as_str()) {
                return Err(ConfigurationError::DuplicateTask(task.name.clone()));
            }
        }

        for task in &self.tasks {
            if let Some(dependency) = task.context.iter().find(|d| !seen.contains(d.as_str())) {
                return Err(ConfigurationError::UnknownDependency {
                    task: task.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }

        self.check_cycles()?;

        let position: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        for (index, task) in self.tasks.iter().enumerate() {
            for dependency in &task.context {
                if position[dependency.as_str()] >= index {
                    return Err(ConfigurationError::ForwardReference {
                        task: task.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn check_cycles(&self) -> Result<(), ConfigurationError> {
        let graph: HashMap<&str, &[String]> = self
            .tasks
            .iter()
            .map(|t| (t.name.as_str(), t.context.as_slice()))
            .collect();
        let mut marks = HashMap::new();
        let mut path = Vec::new();

        for task in &self.tasks {
            visit(task.name.as_str(), &graph, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// Validate, then produce task specs with `topic` filled into every
    /// description, expected output and agent persona.
    pub fn instantiate(&self, topic: &str) -> Result<Vec<TaskSpec>, ConfigurationError> {
        self.validate()?;

        let inputs = HashMap::from([("topic".to_string(), topic.to_string())]);
        let mut agents: HashMap<Uuid, Arc<Agent>> = HashMap::new();
        let mut specs = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let missing = |e: TemplateError| match e {
                TemplateError::MissingVariable(variable) => ConfigurationError::MissingTemplateVariable {
                    task: task.name.clone(),
                    variable,
                },
            };

            let agent = match agents.get(&task.agent.id) {
                Some(agent) => agent.clone(),
                None => {
                    let agent = Arc::new(task.agent.interpolated(&inputs).map_err(missing)?);
                    agents.insert(task.agent.id, agent.clone());
                    agent
                }
            };

            specs.push(
                TaskSpec::new(
                    task.name.clone(),
                    interpolate(&task.description, &inputs).map_err(missing)?,
                    interpolate(&task.expected_output, &inputs).map_err(missing)?,
                    agent,
                )
                .with_context(task.context.iter().cloned())
                .with_markdown(task.markdown),
            );
        }

        Ok(specs)
    }
}

fn visit<'a>(
    name: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Result<(), ConfigurationError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = path.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(ConfigurationError::CyclicDependency { cycle });
        }
        None => {}
    }

    marks.insert(name, Mark::InProgress);
    path.push(name);
    for dependency in graph.get(name).copied().unwrap_or_default() {
        visit(dependency.as_str(), graph, marks, path)?;
    }
    path.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Arc<Agent> {
        Arc::new(Agent::new("Analyst", "Study {topic}", "Veteran"))
    }

    fn def(name: &str, context: &[&str]) -> TaskDefinition {
        TaskDefinition::new(name, format!("{} on {{topic}}", name), "report", agent())
            .with_context(context.iter().copied())
    }

    fn pipeline(tasks: Vec<TaskDefinition>) -> PipelineDefinition {
        tasks.into_iter().fold(PipelineDefinition::new(), PipelineDefinition::with_task)
    }

    #[test]
    fn test_linear_pipeline_is_valid() {
        let p = pipeline(vec![def("a", &[]), def("b", &["a"]), def("c", &["a", "b"])]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(PipelineDefinition::new().validate(), Err(ConfigurationError::EmptyPipeline));
        assert_eq!(
            pipeline(vec![def(" ", &[])]).validate(),
            Err(ConfigurationError::EmptyTaskName)
        );
        assert_eq!(
            pipeline(vec![def("a", &[]), def("a", &[])]).validate(),
            Err(ConfigurationError::DuplicateTask("a".into()))
        );
        assert_eq!(
            pipeline(vec![def("a", &["ghost"])]).validate(),
            Err(ConfigurationError::UnknownDependency {
                task: "a".into(),
                dependency: "ghost".into()
            })
        );
    }

    #[test]
    fn test_cycle_detected() {
        let p = pipeline(vec![def("a", &["c"]), def("b", &["a"]), def("c", &["b"])]);
        assert_eq!(
            p.validate(),
            Err(ConfigurationError::CyclicDependency {
                cycle: vec!["a".into(), "c".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let p = pipeline(vec![def("a", &["a"])]);
        assert_eq!(
            p.validate(),
            Err(ConfigurationError::CyclicDependency {
                cycle: vec!["a".into(), "a".into()]
            })
        );
    }

    #[test]
    fn test_forward_reference() {
        let p = pipeline(vec![def("a", &["b"]), def("b", &[])]);
        assert_eq!(
            p.validate(),
            Err(ConfigurationError::ForwardReference {
                task: "a".into(),
                dependency: "b".into()
            })
        );
    }

    #[test]
    fn test_instantiate_fills_topic_and_shares_agents() {
        let shared = agent();
        let p = PipelineDefinition::new()
            .with_task(TaskDefinition::new("a", "Research {topic}", "About {topic}", shared.clone()))
            .with_task(TaskDefinition::new("b", "Analyze {topic}", "r", shared).with_context(["a"]));

        let specs = p.instantiate("EV Growth in India").unwrap();
        assert_eq!(specs[0].description, "Research EV Growth in India");
        assert_eq!(specs[0].expected_output, "About EV Growth in India");
        assert_eq!(specs[0].agent.goal, "Study EV Growth in India");
        assert!(Arc::ptr_eq(&specs[0].agent, &specs[1].agent));
        assert_eq!(specs[1].context, vec!["a"]);
    }

    #[test]
    fn test_instantiate_reports_unknown_placeholder() {
        let p = pipeline(vec![TaskDefinition::new("a", "Study {region}", "r", agent())]);
        assert_eq!(
            p.instantiate("EVs").unwrap_err(),
            ConfigurationError::MissingTemplateVariable {
                task: "a".into(),
                variable: "region".into()
            }
        );
    }

    #[test]
    fn test_map_agents_keeps_sharing() {
        let shared = agent();
        let p = PipelineDefinition::new()
            .with_task(TaskDefinition::new("a", "d", "e", shared.clone()))
            .with_task(TaskDefinition::new("b", "d", "e", shared))
            .map_agents(|a| a.with_verbose(true));
        assert!(p.tasks()[0].agent.verbose);
        assert!(Arc::ptr_eq(&p.tasks()[0].agent, &p.tasks()[1].agent));
    }
}
