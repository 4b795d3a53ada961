//! Input guardrail types and traits.
//!
//! Input guardrails validate the agent's input, enabling early rejection of
//! off-topic, unsafe, or policy-violating requests.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::agent::{Agent, AgentInput};
use crate::context::RunContext;
use crate::error::Result;

use super::GuardrailOutput;
use super::function::{AsyncMarker, CheckMarker, GuardrailFunction, SyncMarker, identifier_of};

/// Trait for implementing input guardrail check logic on your own type.
///
/// The [`check`](InputGuardrailCheck::check) method receives the run context,
/// the agent being checked, and its input.
#[async_trait]
pub trait InputGuardrailCheck: Send + Sync {
    /// Check the input and return a guardrail output.
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        input: &AgentInput,
    ) -> Result<GuardrailOutput>;
}

/// Anything that can act as an input guardrail function.
///
/// Implemented for:
/// - `fn(&RunContext, &Agent, &AgentInput) -> Result<GuardrailOutput>`
/// - `async fn(RunContext, Arc<Agent>, AgentInput) -> Result<GuardrailOutput>`
/// - types implementing [`InputGuardrailCheck`]
///
/// The `M` parameter only disambiguates the three forms.
pub trait IntoInputGuardrailFunction<M>: Send + Sync + 'static {
    /// Convert into a guardrail function.
    fn into_guardrail_function(self) -> GuardrailFunction<AgentInput>;
}

impl<F> IntoInputGuardrailFunction<SyncMarker> for F
where
    F: Fn(&RunContext, &Agent, &AgentInput) -> Result<GuardrailOutput> + Send + Sync + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<AgentInput> {
        GuardrailFunction::from_sync(identifier_of::<F>(), self)
    }
}

impl<F, Fut> IntoInputGuardrailFunction<(AsyncMarker, Fut)> for F
where
    F: Fn(RunContext, Arc<Agent>, AgentInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<GuardrailOutput>> + Send + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<AgentInput> {
        GuardrailFunction::from_async(identifier_of::<F>(), move |ctx, agent, input| {
            self(ctx, agent, input).boxed()
        })
    }
}

impl<C> IntoInputGuardrailFunction<CheckMarker> for C
where
    C: InputGuardrailCheck + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<AgentInput> {
        let check = Arc::new(self);
        GuardrailFunction::from_async(identifier_of::<C>(), move |ctx, agent, input| {
            let check = Arc::clone(&check);
            async move { check.check(&ctx, &agent, &input).await }.boxed()
        })
    }
}

impl IntoInputGuardrailFunction<()> for GuardrailFunction<AgentInput> {
    fn into_guardrail_function(self) -> GuardrailFunction<AgentInput> {
        self
    }
}

/// A guardrail that checks an agent's input.
///
/// Cloning is cheap; the function sits behind an `Arc`.
#[derive(Clone)]
pub struct InputGuardrail {
    function: GuardrailFunction<AgentInput>,
    name: Option<String>,
}

impl InputGuardrail {
    /// Create an unnamed input guardrail.
    #[must_use]
    pub fn new<M>(function: impl IntoInputGuardrailFunction<M>) -> Self {
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
    pub const fn function(&self) -> &GuardrailFunction<AgentInput> {
        &self.function
    }

    /// Run the check once against `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error) if the function is not
    /// callable; errors raised by the function propagate unchanged.
    pub async fn run(
        &self,
        context: &RunContext,
        agent: &Arc<Agent>,
        input: &AgentInput,
    ) -> Result<InputGuardrailResult> {
        let output = self.function.invoke(context, agent, input.clone()).await?;
        Ok(InputGuardrailResult {
            guardrail: self.clone(),
            output,
        })
    }
}

impl fmt::Debug for InputGuardrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputGuardrail")
            .field("name", &self.name())
            .field("function", &self.function)
            .finish()
    }
}

/// The result of running an input guardrail.
#[derive(Debug, Clone)]
pub struct InputGuardrailResult {
    /// The guardrail that was run.
    pub guardrail: InputGuardrail,
    /// The guardrail's outcome.
    pub output: GuardrailOutput,
}

impl InputGuardrailResult {
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

    fn keyword_filter(
        _ctx: &RunContext,
        _agent: &Agent,
        input: &AgentInput,
    ) -> Result<GuardrailOutput> {
        let text = serde_json::Value::from(input.to_input_list()).to_string();
        if text.contains("homework") {
            Ok(GuardrailOutput::tripwire(json!({"reason": "homework"})))
        } else {
            Ok(GuardrailOutput::pass_with_info(json!({"checked": true})))
        }
    }

    async fn async_keyword_filter(
        ctx: RunContext,
        agent: Arc<Agent>,
        input: AgentInput,
    ) -> Result<GuardrailOutput> {
        tokio::task::yield_now().await;
        keyword_filter(&ctx, &agent, &input)
    }

    struct LengthLimit(usize);

    #[async_trait]
    impl InputGuardrailCheck for LengthLimit {
        async fn check(
            &self,
            _context: &RunContext,
            _agent: &Agent,
            input: &AgentInput,
        ) -> Result<GuardrailOutput> {
            match input {
                AgentInput::Text(t) if t.len() > self.0 => Ok(GuardrailOutput::tripwire("too long")),
                _ => Ok(GuardrailOutput::pass()),
            }
        }
    }

    fn fixtures() -> (RunContext, Arc<Agent>, AgentInput) {
        (
            RunContext::new(),
            Arc::new(Agent::new("tutor")),
            AgentInput::from("help with my homework"),
        )
    }

    #[tokio::test]
    async fn test_sync_run_matches_direct_call() {
        let (ctx, agent, input) = fixtures();
        let direct = keyword_filter(&ctx, &agent, &input).unwrap();

        let result = InputGuardrail::new(keyword_filter)
            .run(&ctx, &agent, &input)
            .await
            .unwrap();
        assert_eq!(result.output, direct);
        assert!(result.is_triggered());
    }

    #[tokio::test]
    async fn test_async_run_matches_awaited_call() {
        let (ctx, agent, input) = fixtures();
        let direct = async_keyword_filter(ctx.clone(), agent.clone(), input.clone())
            .await
            .unwrap();

        let result = InputGuardrail::new(async_keyword_filter)
            .run(&ctx, &agent, &input)
            .await
            .unwrap();
        assert_eq!(result.output, direct);
    }

    #[tokio::test]
    async fn test_check_trait_form() {
        let (ctx, agent, input) = fixtures();
        let guardrail = InputGuardrail::new(LengthLimit(5));
        assert_eq!(guardrail.name(), "LengthLimit");
        let result = guardrail.run(&ctx, &agent, &input).await.unwrap();
        assert_eq!(result.output.output_info, json!("too long"));
    }

    #[tokio::test]
    async fn test_unbound_function_fails() {
        let (ctx, agent, input) = fixtures();
        let guardrail = InputGuardrail::new(GuardrailFunction::<AgentInput>::unbound("missing"));
        let err = guardrail.run(&ctx, &agent, &input).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_user_error_propagates() {
        fn failing(_: &RunContext, _: &Agent, _: &AgentInput) -> Result<GuardrailOutput> {
            Err(Error::other("classifier offline"))
        }
        let (ctx, agent, input) = fixtures();
        let err = InputGuardrail::new(failing)
            .run(&ctx, &agent, &input)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "classifier offline");
    }

    #[test]
    fn test_name() {
        assert_eq!(InputGuardrail::new(keyword_filter).name(), "keyword_filter");
        assert_eq!(
            InputGuardrail::new(keyword_filter).with_name("homework").name(),
            "homework"
        );
    }
}
