//! Task definitions bound to an agent.

use std::fmt;
use std::sync::Arc;

use crate::agent::Agent;

const MARKDOWN_INSTRUCTIONS: &str = "\
Your final answer MUST be formatted in Markdown syntax.\n\
Follow these guidelines:\n\
- Use # for headers\n\
- Use ** for bold text\n\
- Use * for italic text\n\
- Use - or * for bullet points\n\
- Use `code` for inline code\n\
- Use ```language for code blocks";

/// Header placed between the task prompt and its dependency context.
pub const CONTEXT_HEADER: &str = "This is the context you're working with:";

/// One stage of a pipeline: what to do, who does it, and which earlier
/// stages it builds on.
///
/// A `TaskSpec` holds no run state. Status and output of each run live in an
/// [`ExecutionContext`](crate::ExecutionContext), so the same spec can be run
/// any number of times.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Unique name within the pipeline.
    pub name: String,
    /// What the agent is asked to do, with the topic already filled in.
    pub description: String,
    /// Description of a good answer. Rendered into the prompt, never checked.
    pub expected_output: String,
    /// Agent responsible for execution.
    pub agent: Arc<Agent>,
    /// Names of tasks whose output is injected as context, in order.
    pub context: Vec<String>,
    /// Ask for the final answer in Markdown.
    pub markdown: bool,
}

impl TaskSpec {
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

    /// The task prompt without dependency context.
    pub fn prompt(&self) -> String {
        let mut slices = vec![
            self.description.clone(),
            format!("Expected Output: {}", self.expected_output),
        ];
        if self.markdown {
            slices.push(MARKDOWN_INSTRUCTIONS.to_string());
        }
        slices.join("\n")
    }

    /// The prompt with a rendered context block appended. An empty context
    /// leaves the prompt unchanged.
    pub fn prompt_with_context(&self, context: &str) -> String {
        if context.trim().is_empty() {
            self.prompt()
        } else {
            format!("{}\n\n{}\n{}", self.prompt(), CONTEXT_HEADER, context)
        }
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task(name={}, agent={})", self.name, self.agent.role)
    }
}
