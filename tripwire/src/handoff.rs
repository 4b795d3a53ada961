//! Handoffs: transferring control to another agent.
//!
//! The model sees a handoff as one more function tool. Calling it tells the
//! run loop to switch agents; deciding what happens next is not this
//! crate's concern.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A handoff to another agent, described as a callable function tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    /// Function name the model calls to hand off.
    pub tool_name: String,
    /// Description shown to the model.
    pub tool_description: String,
    /// JSON schema of the handoff arguments.
    pub input_json_schema: Value,
    /// Whether the schema is enforced strictly.
    pub strict_json_schema: bool,
    /// Name of the agent receiving control.
    pub agent_name: String,
}

impl Handoff {
    /// The default handoff to `agent_name`: no arguments, strict schema,
    /// tool name `transfer_to_<agent_name in snake case>`.
    #[must_use]
    pub fn to_agent(agent_name: impl Into<String>) -> Self {
        let agent_name = agent_name.into();
        Self {
            tool_name: default_tool_name(&agent_name),
            tool_description: format!(
                "Handoff to the {agent_name} agent to handle the request."
            ),
            input_json_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {},
                "required": []
            }),
            strict_json_schema: true,
            agent_name,
        }
    }

    /// Override the tool name.
    #[must_use]
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    /// Override the tool description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.tool_description = description.into();
        self
    }

    /// Accept arguments described by `schema`.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value, strict: bool) -> Self {
        self.input_json_schema = schema;
        self.strict_json_schema = strict;
        self
    }
}

fn default_tool_name(agent_name: &str) -> String {
    let snake: String = agent_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("transfer_to_{snake}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_handoff() {
        let handoff = Handoff::to_agent("Billing Agent");
        assert_eq!(handoff.tool_name, "transfer_to_billing_agent");
        assert_eq!(
            handoff.tool_description,
            "Handoff to the Billing Agent agent to handle the request."
        );
        assert!(handoff.strict_json_schema);
        assert_eq!(handoff.input_json_schema["type"], "object");
        assert_eq!(handoff.agent_name, "Billing Agent");
    }

    #[test]
    fn test_handoff_overrides() {
        let handoff = Handoff::to_agent("triage")
            .with_tool_name("escalate")
            .with_description("Escalate to triage")
            .with_input_schema(json!({"type": "object"}), false);
        assert_eq!(handoff.tool_name, "escalate");
        assert_eq!(handoff.tool_description, "Escalate to triage");
        assert!(!handoff.strict_json_schema);
    }
}
