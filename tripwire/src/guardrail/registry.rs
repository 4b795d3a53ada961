//! Building guardrails from declarative configuration.
//!
//! Functions are registered under string keys; a [`GuardrailConfig`] names a
//! key and an optional display name. A key that was never registered still
//! yields a guardrail, but one whose function is unbound, so running it
//! fails with [`Error::Configuration`](crate::Error).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::agent::AgentInput;

use super::{
    FactCheckingGuardrail, FactCheckingPayload, GuardrailFunction, InputGuardrail,
    IntoFactCheckingGuardrailFunction, IntoInputGuardrailFunction, IntoOutputGuardrailFunction,
    OutputGuardrail,
};

/// Declarative description of one guardrail.
///
/// ```json
/// {"function": "no_homework", "name": "Homework filter"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Registry key of the guardrail function.
    pub function: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Guardrail functions by key, one table per guardrail kind.
#[derive(Debug, Clone, Default)]
pub struct GuardrailRegistry {
    input: HashMap<String, GuardrailFunction<AgentInput>>,
    output: HashMap<String, GuardrailFunction<Value>>,
    fact_checking: HashMap<String, GuardrailFunction<FactCheckingPayload>>,
}

impl GuardrailRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input guardrail function under `key`.
    #[must_use]
    pub fn register_input<M>(
        mut self,
        key: impl Into<String>,
        function: impl IntoInputGuardrailFunction<M>,
    ) -> Self {
        self.input
            .insert(key.into(), function.into_guardrail_function());
        self
    }

    /// Register an output guardrail function under `key`.
    #[must_use]
    pub fn register_output<M>(
        mut self,
        key: impl Into<String>,
        function: impl IntoOutputGuardrailFunction<M>,
    ) -> Self {
        self.output
            .insert(key.into(), function.into_guardrail_function());
        self
    }

    /// Register a fact-checking guardrail function under `key`.
    #[must_use]
    pub fn register_fact_checking<M>(
        mut self,
        key: impl Into<String>,
        function: impl IntoFactCheckingGuardrailFunction<M>,
    ) -> Self {
        self.fact_checking
            .insert(key.into(), function.into_guardrail_function());
        self
    }

    /// Build an input guardrail from `config`.
    #[must_use]
    pub fn input_guardrail(&self, config: &GuardrailConfig) -> InputGuardrail {
        let guardrail = InputGuardrail::new(lookup(&self.input, config, "input"));
        match &config.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }

    /// Build an output guardrail from `config`.
    #[must_use]
    pub fn output_guardrail(&self, config: &GuardrailConfig) -> OutputGuardrail {
        let guardrail = OutputGuardrail::new(lookup(&self.output, config, "output"));
        match &config.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }

    /// Build a fact-checking guardrail from `config`.
    #[must_use]
    pub fn fact_checking_guardrail(&self, config: &GuardrailConfig) -> FactCheckingGuardrail {
        let guardrail =
            FactCheckingGuardrail::new(lookup(&self.fact_checking, config, "fact-checking"));
        match &config.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }
}

fn lookup<P: Send + 'static>(
    table: &HashMap<String, GuardrailFunction<P>>,
    config: &GuardrailConfig,
    kind: &str,
) -> GuardrailFunction<P> {
    table.get(&config.function).cloned().unwrap_or_else(|| {
        warn!(function = %config.function, kind, "Guardrail function not registered");
        GuardrailFunction::unbound(config.function.clone())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::agent::Agent;
    use crate::context::RunContext;
    use crate::error::{Error, Result};
    use crate::guardrail::GuardrailOutput;

    fn no_homework(_: &RunContext, _: &Agent, input: &AgentInput) -> Result<GuardrailOutput> {
        Ok(match input {
            AgentInput::Text(t) if t.contains("homework") => GuardrailOutput::tripwire("homework"),
            _ => GuardrailOutput::pass(),
        })
    }

    #[tokio::test]
    async fn test_resolves_registered_function() {
        let registry = GuardrailRegistry::new().register_input("no_homework", no_homework);
        let config: GuardrailConfig =
            serde_json::from_value(json!({"function": "no_homework", "name": "Homework"}))
                .unwrap();

        let guardrail = registry.input_guardrail(&config);
        assert_eq!(guardrail.name(), "Homework");
        let result = guardrail
            .run(
                &RunContext::new(),
                &Arc::new(Agent::new("a")),
                &AgentInput::from("do my homework"),
            )
            .await
            .unwrap();
        assert!(result.is_triggered());
    }

    #[tokio::test]
    async fn test_unknown_key_yields_unbound_guardrail() {
        let registry = GuardrailRegistry::new();
        let config = GuardrailConfig {
            function: "missing_check".to_owned(),
            name: None,
        };

        let guardrail = registry.output_guardrail(&config);
        assert_eq!(guardrail.name(), "missing_check");
        assert!(!guardrail.function().is_callable());

        let err = guardrail
            .run(&RunContext::new(), &Arc::new(Agent::new("a")), &json!("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Guardrail function must be callable, got missing_check"
        );
    }

    #[test]
    fn test_kinds_are_separate() {
        let registry = GuardrailRegistry::new().register_input("no_homework", no_homework);
        let config = GuardrailConfig {
            function: "no_homework".to_owned(),
            name: None,
        };
        assert!(registry.input_guardrail(&config).function().is_callable());
        assert!(!registry.fact_checking_guardrail(&config).function().is_callable());
    }
}
