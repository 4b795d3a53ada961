//! Agent definition as seen by guardrails and models.
//!
//! An [`Agent`] is plain data: instructions, a model name, tools, handoffs,
//! an output schema, and guardrails. Deciding when to call the model or
//! which agent runs next belongs to the run loop, which is outside this
//! crate.
//!
//! ```rust
//! use tripwire::agent::Agent;
//! use tripwire::handoff::Handoff;
//!
//! let agent = Agent::new("triage")
//!     .instructions("Route the user to the right specialist.")
//!     .model("gpt-4o")
//!     .handoff(Handoff::to_agent("billing"));
//!
//! assert_eq!(agent.name, "triage");
//! assert_eq!(agent.handoffs[0].tool_name, "transfer_to_billing");
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::context::RunContext;
use crate::error::Result;
use crate::guardrail::{
    FactCheckingGuardrail, FactCheckingGuardrailResult, InputGuardrail, InputGuardrailResult,
    OutputGuardrail, OutputGuardrailResult, run_fact_checking_guardrails, run_input_guardrails,
    run_output_guardrails,
};
use crate::handoff::Handoff;
use crate::model_settings::ModelSettings;
use crate::output_schema::AgentOutputSchema;
use crate::tool::Tool;

/// Input to an agent: a plain string or a list of provider input items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentInput {
    /// A single user message.
    Text(String),
    /// Provider input items, passed through verbatim.
    Items(Vec<Value>),
}

impl AgentInput {
    /// Normalise to the provider's message-list form.
    ///
    /// A string becomes a single user message.
    #[must_use]
    pub fn to_input_list(&self) -> Vec<Value> {
        match self {
            Self::Text(text) => vec![json!({ "content": text, "role": "user" })],
            Self::Items(items) => items.clone(),
        }
    }
}

impl From<&str> for AgentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for AgentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Value>> for AgentInput {
    fn from(items: Vec<Value>) -> Self {
        Self::Items(items)
    }
}

/// An agent: a model configured with instructions, tools, handoffs and
/// guardrails.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Agent name, used in handoffs and logs.
    pub name: String,
    /// System instructions.
    pub instructions: Option<String>,
    /// Description used when other agents hand off to this one.
    pub handoff_description: Option<String>,
    /// Model name; `None` uses the provider default.
    pub model: Option<String>,
    /// Model settings.
    pub model_settings: ModelSettings,
    /// Tools exposed to the model.
    pub tools: Vec<Tool>,
    /// Agents this one can hand off to.
    pub handoffs: Vec<Handoff>,
    /// Final output type; `None` means plain text.
    pub output_schema: Option<AgentOutputSchema>,
    /// Checks run against the agent's input.
    pub input_guardrails: Vec<InputGuardrail>,
    /// Checks run against the agent's final output.
    pub output_guardrails: Vec<OutputGuardrail>,
    /// Checks run against the final output and the input together.
    pub fact_checking_guardrails: Vec<FactCheckingGuardrail>,
}

impl Agent {
    /// Create an agent with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            handoff_description: None,
            model: None,
            model_settings: ModelSettings::default(),
            tools: Vec::new(),
            handoffs: Vec::new(),
            output_schema: None,
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            fact_checking_guardrails: Vec::new(),
        }
    }

    /// Set the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the handoff description.
    #[must_use]
    pub fn handoff_description(mut self, description: impl Into<String>) -> Self {
        self.handoff_description = Some(description.into());
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the model settings.
    #[must_use]
    pub fn model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = settings;
        self
    }

    /// Add a tool.
    #[must_use]
    pub fn tool(mut self, tool: impl Into<Tool>) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Add several tools.
    #[must_use]
    pub fn tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Add a handoff.
    #[must_use]
    pub fn handoff(mut self, handoff: Handoff) -> Self {
        self.handoffs.push(handoff);
        self
    }

    /// Set the output schema.
    #[must_use]
    pub fn output_schema(mut self, schema: AgentOutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Add an input guardrail.
    #[must_use]
    pub fn input_guardrail(mut self, guardrail: InputGuardrail) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Add an output guardrail.
    #[must_use]
    pub fn output_guardrail(mut self, guardrail: OutputGuardrail) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Add a fact-checking guardrail.
    #[must_use]
    pub fn fact_checking_guardrail(mut self, guardrail: FactCheckingGuardrail) -> Self {
        self.fact_checking_guardrails.push(guardrail);
        self
    }

    /// Run this agent's input guardrails concurrently.
    ///
    /// # Errors
    ///
    /// See [`run_input_guardrails`].
    pub async fn run_input_guardrails(
        self: &Arc<Self>,
        context: &RunContext,
        input: &AgentInput,
    ) -> Result<Vec<InputGuardrailResult>> {
        run_input_guardrails(&self.input_guardrails, context, self, input).await
    }

    /// Run this agent's output guardrails concurrently.
    ///
    /// # Errors
    ///
    /// See [`run_output_guardrails`].
    pub async fn run_output_guardrails(
        self: &Arc<Self>,
        context: &RunContext,
        agent_output: &Value,
    ) -> Result<Vec<OutputGuardrailResult>> {
        run_output_guardrails(&self.output_guardrails, context, self, agent_output).await
    }

    /// Run this agent's fact-checking guardrails concurrently.
    ///
    /// # Errors
    ///
    /// See [`run_fact_checking_guardrails`].
    pub async fn run_fact_checking_guardrails(
        self: &Arc<Self>,
        context: &RunContext,
        agent_output: &Value,
        agent_input: &AgentInput,
    ) -> Result<Vec<FactCheckingGuardrailResult>> {
        run_fact_checking_guardrails(
            &self.fact_checking_guardrails,
            context,
            self,
            agent_output,
            agent_input,
        )
        .await
    }
}
