//! Guardrail module: safety checks for agent inputs and outputs.
//!
//! Guardrails are validation checks that run alongside agent execution to
//! ensure inputs and outputs meet safety, quality, and policy criteria.
//! Three kinds exist:
//!
//! - **[`InputGuardrail`]** validates the agent's input (off-topic
//!   detection, content filtering).
//! - **[`OutputGuardrail`]** validates the agent's final output (PII
//!   detection, format checking).
//! - **[`FactCheckingGuardrail`]** validates the output against the input
//!   it was produced from.
//!
//! # Tripwire Mechanism
//!
//! Each guardrail returns a [`GuardrailOutput`] containing a
//! `tripwire_triggered` flag. A triggered tripwire is data, not an error:
//! [`InputGuardrail::run`] succeeds and hands the flag back. The group
//! runners ([`run_input_guardrails`] and friends) are where a tripwire turns
//! into [`Error::InputGuardrailTriggered`](crate::Error) and its siblings.
//!
//! # Guardrail Functions
//!
//! A guardrail wraps a plain function, an `async fn`, or a type implementing
//! the kind's check trait:
//!
//! ```rust,ignore
//! use tripwire::prelude::*;
//!
//! fn no_homework(_: &RunContext, _: &Agent, input: &AgentInput) -> Result<GuardrailOutput> {
//!     Ok(match input {
//!         AgentInput::Text(t) if t.contains("homework") => GuardrailOutput::tripwire("homework"),
//!         _ => GuardrailOutput::pass(),
//!     })
//! }
//!
//! async fn moderated(ctx: RunContext, agent: Arc<Agent>, input: AgentInput) -> Result<GuardrailOutput> {
//!     moderation_api(&input).await
//! }
//!
//! let agent = Agent::new("tutor")
//!     .input_guardrail(input_guardrail(no_homework))
//!     .input_guardrail(input_guardrail_with(Some("moderation")).wrap(moderated));
//! ```

mod decorator;
mod fact_checking;
mod function;
mod input;
mod output;
mod registry;

pub use decorator::{
    GuardrailDecorator, fact_checking_guardrail, fact_checking_guardrail_with, input_guardrail,
    input_guardrail_with, output_guardrail, output_guardrail_with,
};
pub use fact_checking::{
    FactCheckingGuardrail, FactCheckingGuardrailCheck, FactCheckingGuardrailResult,
    FactCheckingPayload, IntoFactCheckingGuardrailFunction,
};
pub use function::{AsyncMarker, CheckMarker, GuardrailFunction, SyncMarker};
pub use input::{
    InputGuardrail, InputGuardrailCheck, InputGuardrailResult, IntoInputGuardrailFunction,
};
pub use output::{
    IntoOutputGuardrailFunction, OutputGuardrail, OutputGuardrailCheck, OutputGuardrailResult,
};
pub use registry::{GuardrailConfig, GuardrailRegistry};

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::{Agent, AgentInput};
use crate::context::RunContext;
use crate::error::{Error, Result};

/// The output of a guardrail check function.
///
/// Contains a boolean tripwire flag and optional structured information
/// about the check that was performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailOutput {
    /// Whether the tripwire was triggered.
    ///
    /// Once `true`, the run this check belongs to must stop.
    pub tripwire_triggered: bool,

    /// Diagnostic information defined by the guardrail author.
    ///
    /// Carried through unchanged; this crate never inspects its shape.
    #[serde(default)]
    pub output_info: Value,
}

impl GuardrailOutput {
    /// Create a passing guardrail output (tripwire not triggered).
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            tripwire_triggered: false,
            output_info: Value::Null,
        }
    }

    /// Create a failing guardrail output (tripwire triggered).
    #[must_use]
    pub fn tripwire(info: impl Into<Value>) -> Self {
        Self {
            tripwire_triggered: true,
            output_info: info.into(),
        }
    }

    /// Create a passing output with additional diagnostic information.
    #[must_use]
    pub fn pass_with_info(info: impl Into<Value>) -> Self {
        Self {
            tripwire_triggered: false,
            output_info: info.into(),
        }
    }

    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.tripwire_triggered
    }
}

/// Convenience conversion: a string becomes a tripwire output.
impl From<&str> for GuardrailOutput {
    fn from(reason: &str) -> Self {
        Self::tripwire(Value::String(reason.to_owned()))
    }
}

/// Run input guardrails concurrently.
///
/// Returns every result when no tripwire fires.
///
/// # Errors
///
/// The first error raised by a guardrail, otherwise
/// [`Error::InputGuardrailTriggered`] carrying the first triggered result
/// (in slice order).
pub async fn run_input_guardrails(
    guardrails: &[InputGuardrail],
    context: &RunContext,
    agent: &Arc<Agent>,
    input: &AgentInput,
) -> Result<Vec<InputGuardrailResult>> {
    if guardrails.is_empty() {
        return Ok(Vec::new());
    }
    debug!(agent = %agent.name, count = guardrails.len(), "Running input guardrails");

    let results = join_all(guardrails.iter().map(|g| g.run(context, agent, input)))
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    if let Some(triggered) = results.iter().find(|r| r.is_triggered()) {
        warn!(guardrail = triggered.guardrail.name(), "Input guardrail tripwire triggered");
        return Err(Error::InputGuardrailTriggered(Box::new(triggered.clone())));
    }
    Ok(results)
}

/// Run output guardrails concurrently.
///
/// # Errors
///
/// The first error raised by a guardrail, otherwise
/// [`Error::OutputGuardrailTriggered`] carrying the first triggered result.
pub async fn run_output_guardrails(
    guardrails: &[OutputGuardrail],
    context: &RunContext,
    agent: &Arc<Agent>,
    agent_output: &Value,
) -> Result<Vec<OutputGuardrailResult>> {
    if guardrails.is_empty() {
        return Ok(Vec::new());
    }
    debug!(agent = %agent.name, count = guardrails.len(), "Running output guardrails");

    let results = join_all(
        guardrails
            .iter()
            .map(|g| g.run(context, agent, agent_output)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    if let Some(triggered) = results.iter().find(|r| r.is_triggered()) {
        warn!(guardrail = triggered.guardrail.name(), "Output guardrail tripwire triggered");
        return Err(Error::OutputGuardrailTriggered(Box::new(triggered.clone())));
    }
    Ok(results)
}

/// Run fact-checking guardrails concurrently.
///
/// # Errors
///
/// The first error raised by a guardrail, otherwise
/// [`Error::FactCheckingGuardrailTriggered`] carrying the first triggered
/// result.
pub async fn run_fact_checking_guardrails(
    guardrails: &[FactCheckingGuardrail],
    context: &RunContext,
    agent: &Arc<Agent>,
    agent_output: &Value,
    agent_input: &AgentInput,
) -> Result<Vec<FactCheckingGuardrailResult>> {
    if guardrails.is_empty() {
        return Ok(Vec::new());
    }
    debug!(agent = %agent.name, count = guardrails.len(), "Running fact-checking guardrails");

    let results = join_all(
        guardrails
            .iter()
            .map(|g| g.run(context, agent, agent_output, agent_input)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    if let Some(triggered) = results.iter().find(|r| r.is_triggered()) {
        warn!(
            guardrail = triggered.guardrail.name(),
            "Fact-checking guardrail tripwire triggered"
        );
        return Err(Error::FactCheckingGuardrailTriggered(Box::new(
            triggered.clone(),
        )));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn always_trips(_: &RunContext, _: &Agent, _: &AgentInput) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::tripwire(json!({ "score": 0.97, "label": "unsafe" })))
    }

    fn always_passes(_: &RunContext, _: &Agent, _: &AgentInput) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::pass())
    }

    #[test]
    fn test_output_constructors() {
        assert!(!GuardrailOutput::pass().is_triggered());
        assert!(GuardrailOutput::tripwire("x").is_triggered());
        let info = GuardrailOutput::pass_with_info(json!({"k": 1}));
        assert!(!info.is_triggered());
        assert_eq!(info.output_info, json!({"k": 1}));
        assert_eq!(GuardrailOutput::from("bad"), GuardrailOutput::tripwire("bad"));
    }

    #[tokio::test]
    async fn test_tripwire_result_carries_info_unchanged() {
        let agent = Arc::new(Agent::new("a"));
        let result = InputGuardrail::new(always_trips)
            .run(&RunContext::new(), &agent, &AgentInput::from("hi"))
            .await
            .unwrap();
        assert!(result.output.tripwire_triggered);
        assert_eq!(result.output.output_info, json!({ "score": 0.97, "label": "unsafe" }));
    }

    #[tokio::test]
    async fn test_run_input_guardrails_raises_on_tripwire() {
        let agent = Arc::new(Agent::new("a"));
        let guardrails = [
            InputGuardrail::new(always_passes),
            InputGuardrail::new(always_trips).with_name("moderation"),
        ];
        let err = run_input_guardrails(&guardrails, &RunContext::new(), &agent, &"hi".into())
            .await
            .unwrap_err();
        let Error::InputGuardrailTriggered(result) = err else {
            panic!("expected tripwire error");
        };
        assert_eq!(result.guardrail.name(), "moderation");
        assert_eq!(result.output.output_info["label"], "unsafe");
    }

    #[tokio::test]
    async fn test_run_input_guardrails_all_pass() {
        let agent = Arc::new(Agent::new("a"));
        let guardrails = [InputGuardrail::new(always_passes), InputGuardrail::new(always_passes)];
        let results = run_input_guardrails(&guardrails, &RunContext::new(), &agent, &"hi".into())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(run_input_guardrails(&[], &RunContext::new(), &agent, &"hi".into())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_run_output_guardrails_raises_on_tripwire() {
        fn trips(_: &RunContext, _: &Agent, _: &Value) -> Result<GuardrailOutput> {
            Ok(GuardrailOutput::tripwire("pii"))
        }
        let agent = Arc::new(Agent::new("a"));
        let err = run_output_guardrails(
            &[OutputGuardrail::new(trips)],
            &RunContext::new(),
            &agent,
            &json!("555-0100"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind_name(), "OutputGuardrailTripwireTriggered");
        assert!(err.is_tripwire());
    }

    #[tokio::test]
    async fn test_run_fact_checking_guardrails_surfaces_user_error() {
        fn broken(_: &RunContext, _: &Agent, _: &Value, _: &AgentInput) -> Result<GuardrailOutput> {
            Err(Error::other("source unavailable"))
        }
        let agent = Arc::new(Agent::new("a"));
        let err = run_fact_checking_guardrails(
            &[FactCheckingGuardrail::new(broken)],
            &RunContext::new(),
            &agent,
            &json!({}),
            &"hi".into(),
        )
        .await
        .unwrap_err();
        assert!(!err.is_tripwire());
        assert_eq!(err.to_string(), "source unavailable");
    }
}
