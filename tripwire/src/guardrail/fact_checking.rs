//! Fact-checking guardrails: checks over an agent's output and its input
//! together, e.g. verifying a summary against the source it summarises.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::agent::{Agent, AgentInput};
use crate::context::RunContext;
use crate::error::Result;

use super::GuardrailOutput;
use super::function::{AsyncMarker, CheckMarker, GuardrailFunction, SyncMarker, identifier_of};

/// Payload of a fact-checking guardrail: the agent output and the input it
/// was produced from.
pub type FactCheckingPayload = (Value, AgentInput);

/// Trait for implementing fact-checking logic on your own type.
#[async_trait]
pub trait FactCheckingGuardrailCheck: Send + Sync {
    /// Check `output` against `input` and return a guardrail output.
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        output: &Value,
        input: &AgentInput,
    ) -> Result<GuardrailOutput>;
}

/// Anything that can act as a fact-checking guardrail function.
///
/// Implemented for:
/// - `fn(&RunContext, &Agent, &Value, &AgentInput) -> Result<GuardrailOutput>`
/// - `async fn(RunContext, Arc<Agent>, Value, AgentInput) -> Result<GuardrailOutput>`
/// - types implementing [`FactCheckingGuardrailCheck`]
pub trait IntoFactCheckingGuardrailFunction<M>: Send + Sync + 'static {
    /// Convert into a guardrail function.
    fn into_guardrail_function(self) -> GuardrailFunction<FactCheckingPayload>;
}

impl<F> IntoFactCheckingGuardrailFunction<SyncMarker> for F
where
    F: Fn(&RunContext, &Agent, &Value, &AgentInput) -> Result<GuardrailOutput>
        + Send
        + Sync
        + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<FactCheckingPayload> {
        GuardrailFunction::from_sync(
            identifier_of::<F>(),
            move |ctx: &RunContext, agent: &Agent, (output, input): &FactCheckingPayload| {
                self(ctx, agent, output, input)
            },
        )
    }
}

impl<F, Fut> IntoFactCheckingGuardrailFunction<(AsyncMarker, Fut)> for F
where
    F: Fn(RunContext, Arc<Agent>, Value, AgentInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<GuardrailOutput>> + Send + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<FactCheckingPayload> {
        GuardrailFunction::from_async(identifier_of::<F>(), move |ctx, agent, (output, input)| {
            self(ctx, agent, output, input).boxed()
        })
    }
}

impl<C> IntoFactCheckingGuardrailFunction<CheckMarker> for C
where
    C: FactCheckingGuardrailCheck + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<FactCheckingPayload> {
        let check = Arc::new(self);
        GuardrailFunction::from_async(identifier_of::<C>(), move |ctx, agent, (output, input)| {
            let check = Arc::clone(&check);
            async move { check.check(&ctx, &agent, &output, &input).await }.boxed()
        })
    }
}

impl IntoFactCheckingGuardrailFunction<()> for GuardrailFunction<FactCheckingPayload> {
    fn into_guardrail_function(self) -> GuardrailFunction<FactCheckingPayload> {
        self
    }
}

/// A guardrail that checks an agent's output against its input.
#[derive(Clone)]
pub struct FactCheckingGuardrail {
    function: GuardrailFunction<FactCheckingPayload>,
    name: Option<String>,
}

impl FactCheckingGuardrail {
    /// Create an unnamed fact-checking guardrail.
    #[must_use]
    pub fn new<M>(function: impl IntoFactCheckingGuardrailFunction<M>) -> Self {
        Self {
            function: function.into_guardrail_function(),
            name: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The explicit name if one was given, else the function's identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.function.identifier(),
        }
    }

    /// The wrapped function.
    #[must_use]
    pub const fn function(&self) -> &GuardrailFunction<FactCheckingPayload> {
        &self.function
    }

    /// Run the check once against the agent's output and input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error) if the function is not
    /// callable; errors raised by the function propagate unchanged.
    pub async fn run(
        &self,
        context: &RunContext,
        agent: &Arc<Agent>,
        agent_output: &Value,
        agent_input: &AgentInput,
    ) -> Result<FactCheckingGuardrailResult> {
        let output = self
            .function
            .invoke(context, agent, (agent_output.clone(), agent_input.clone()))
            .await?;
        Ok(FactCheckingGuardrailResult {
            guardrail: self.clone(),
            agent: Arc::clone(agent),
            agent_output: agent_output.clone(),
            agent_input: agent_input.clone(),
            output,
        })
    }
}

impl fmt::Debug for FactCheckingGuardrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactCheckingGuardrail")
            .field("name", &self.name())
            .field("function", &self.function)
            .finish()
    }
}

/// The result of running a fact-checking guardrail.
#[derive(Debug, Clone)]
pub struct FactCheckingGuardrailResult {
    /// The guardrail that was run.
    pub guardrail: FactCheckingGuardrail,
    /// The agent that was checked.
    pub agent: Arc<Agent>,
    /// The output that was checked.
    pub agent_output: Value,
    /// The input the output was produced from.
    pub agent_input: AgentInput,
    /// The guardrail's outcome.
    pub output: GuardrailOutput,
}

impl FactCheckingGuardrailResult {
    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.output.tripwire_triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn age_matches(
        _: &RunContext,
        _: &Agent,
        output: &Value,
        input: &AgentInput,
    ) -> Result<GuardrailOutput> {
        let AgentInput::Text(text) = input else {
            return Ok(GuardrailOutput::pass());
        };
        let age = output["age"].as_u64().unwrap_or_default();
        let consistent = text.contains(&age.to_string());
        Ok(GuardrailOutput {
            tripwire_triggered: !consistent,
            output_info: json!({ "age": age, "consistent": consistent }),
        })
    }

    async fn async_age_matches(
        ctx: RunContext,
        agent: Arc<Agent>,
        output: Value,
        input: AgentInput,
    ) -> Result<GuardrailOutput> {
        age_matches(&ctx, &agent, &output, &input)
    }

    struct AlwaysTrips;

    #[async_trait]
    impl FactCheckingGuardrailCheck for AlwaysTrips {
        async fn check(
            &self,
            _: &RunContext,
            _: &Agent,
            _: &Value,
            _: &AgentInput,
        ) -> Result<GuardrailOutput> {
            Ok(GuardrailOutput::tripwire("mismatch"))
        }
    }

    #[tokio::test]
    async fn test_sync_and_async_agree() {
        let ctx = RunContext::new();
        let agent = Arc::new(Agent::new("profiler"));
        let output = json!({ "age": 41 });
        let input = AgentInput::from("Alex is 42 years old");

        let direct = age_matches(&ctx, &agent, &output, &input).unwrap();
        assert!(direct.tripwire_triggered);

        let sync = FactCheckingGuardrail::new(age_matches)
            .run(&ctx, &agent, &output, &input)
            .await
            .unwrap();
        let not_sync = FactCheckingGuardrail::new(async_age_matches)
            .run(&ctx, &agent, &output, &input)
            .await
            .unwrap();

        assert_eq!(sync.output, direct);
        assert_eq!(not_sync.output, direct);
        assert_eq!(sync.agent_input, input);
        assert_eq!(sync.agent_output, output);
    }

    #[tokio::test]
    async fn test_check_trait_form() {
        let result = FactCheckingGuardrail::new(AlwaysTrips)
            .run(
                &RunContext::new(),
                &Arc::new(Agent::new("a")),
                &json!({}),
                &AgentInput::from("x"),
            )
            .await
            .unwrap();
        assert!(result.is_triggered());
        assert_eq!(result.guardrail.name(), "AlwaysTrips");
    }

    #[tokio::test]
    async fn test_unbound_function_fails() {
        let guardrail =
            FactCheckingGuardrail::new(GuardrailFunction::<FactCheckingPayload>::unbound("gone"));
        let err = guardrail
            .run(
                &RunContext::new(),
                &Arc::new(Agent::new("a")),
                &json!({}),
                &AgentInput::from("x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_name() {
        assert_eq!(FactCheckingGuardrail::new(age_matches).name(), "age_matches");
        assert_eq!(
            FactCheckingGuardrail::new(age_matches).with_name("ages").name(),
            "ages"
        );
    }
}
