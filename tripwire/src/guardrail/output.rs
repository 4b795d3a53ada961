//! Output guardrail types and traits.
//!
//! Output guardrails validate the agent's final output after generation
//! (e.g., PII detection, format checking, policy compliance).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::agent::Agent;
use crate::context::RunContext;
use crate::error::Result;

use super::GuardrailOutput;
use super::function::{AsyncMarker, CheckMarker, GuardrailFunction, SyncMarker, identifier_of};

/// Trait for implementing output guardrail check logic on your own type.
#[async_trait]
pub trait OutputGuardrailCheck: Send + Sync {
    /// Check the agent's output and return a guardrail output.
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        output: &Value,
    ) -> Result<GuardrailOutput>;
}

/// Anything that can act as an output guardrail function.
///
/// Implemented for:
/// - `fn(&RunContext, &Agent, &Value) -> Result<GuardrailOutput>`
/// - `async fn(RunContext, Arc<Agent>, Value) -> Result<GuardrailOutput>`
/// - types implementing [`OutputGuardrailCheck`]
pub trait IntoOutputGuardrailFunction<M>: Send + Sync + 'static {
    /// Convert into a guardrail function.
    fn into_guardrail_function(self) -> GuardrailFunction<Value>;
}

impl<F> IntoOutputGuardrailFunction<SyncMarker> for F
where
    F: Fn(&RunContext, &Agent, &Value) -> Result<GuardrailOutput> + Send + Sync + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<Value> {
        GuardrailFunction::from_sync(identifier_of::<F>(), self)
    }
}

impl<F, Fut> IntoOutputGuardrailFunction<(AsyncMarker, Fut)> for F
where
    F: Fn(RunContext, Arc<Agent>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<GuardrailOutput>> + Send + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<Value> {
        GuardrailFunction::from_async(identifier_of::<F>(), move |ctx, agent, output| {
            self(ctx, agent, output).boxed()
        })
    }
}

impl<C> IntoOutputGuardrailFunction<CheckMarker> for C
where
    C: OutputGuardrailCheck + 'static,
{
    fn into_guardrail_function(self) -> GuardrailFunction<Value> {
        let check = Arc::new(self);
        GuardrailFunction::from_async(identifier_of::<C>(), move |ctx, agent, output| {
            let check = Arc::clone(&check);
            async move { check.check(&ctx, &agent, &output).await }.boxed()
        })
    }
}

impl IntoOutputGuardrailFunction<()> for GuardrailFunction<Value> {
    fn into_guardrail_function(self) -> GuardrailFunction<Value> {
        self
    }
}

/// A guardrail that checks an agent's final output.
#[derive(Clone)]
pub struct OutputGuardrail {
    function: GuardrailFunction<Value>,
    name: Option<String>,
}

impl OutputGuardrail {
    /// Create an unnamed output guardrail.
    #[must_use]
    pub fn new<M>(function: impl IntoOutputGuardrailFunction<M>) -> Self {
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
    pub const fn function(&self) -> &GuardrailFunction<Value> {
        &self.function
    }

    /// Run the check once against the agent's output.
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
    ) -> Result<OutputGuardrailResult> {
        let output = self
            .function
            .invoke(context, agent, agent_output.clone())
            .await?;
        Ok(OutputGuardrailResult {
            guardrail: self.clone(),
            agent: Arc::clone(agent),
            agent_output: agent_output.clone(),
            output,
        })
    }
}

impl fmt::Debug for OutputGuardrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputGuardrail")
            .field("name", &self.name())
            .field("function", &self.function)
            .finish()
    }
}

/// The result of running an output guardrail.
#[derive(Debug, Clone)]
pub struct OutputGuardrailResult {
    /// The guardrail that was run.
    pub guardrail: OutputGuardrail,
    /// The agent whose output was checked.
    pub agent: Arc<Agent>,
    /// The output that was checked.
    pub agent_output: Value,
    /// The guardrail's outcome.
    pub output: GuardrailOutput,
}

impl OutputGuardrailResult {
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

    fn no_email(_: &RunContext, _: &Agent, output: &Value) -> Result<GuardrailOutput> {
        let leaked = output.to_string().contains('@');
        Ok(GuardrailOutput {
            tripwire_triggered: leaked,
            output_info: json!({ "leaked": leaked }),
        })
    }

    async fn async_no_email(
        ctx: RunContext,
        agent: Arc<Agent>,
        output: Value,
    ) -> Result<GuardrailOutput> {
        no_email(&ctx, &agent, &output)
    }

    struct MaxLength(usize);

    #[async_trait]
    impl OutputGuardrailCheck for MaxLength {
        async fn check(&self, _: &RunContext, _: &Agent, output: &Value) -> Result<GuardrailOutput> {
            let len = output.as_str().map_or(0, str::len);
            if len > self.0 {
                Ok(GuardrailOutput::tripwire(json!({ "len": len })))
            } else {
                Ok(GuardrailOutput::pass())
            }
        }
    }

    #[tokio::test]
    async fn test_sync_and_async_agree() {
        let ctx = RunContext::new();
        let agent = Arc::new(Agent::new("support"));
        let output = json!("mail me at a@b.c");

        let direct = no_email(&ctx, &agent, &output).unwrap();
        let sync = OutputGuardrail::new(no_email)
            .run(&ctx, &agent, &output)
            .await
            .unwrap();
        let not_sync = OutputGuardrail::new(async_no_email)
            .run(&ctx, &agent, &output)
            .await
            .unwrap();

        assert_eq!(sync.output, direct);
        assert_eq!(not_sync.output, direct);
        assert_eq!(sync.agent_output, output);
        assert_eq!(sync.agent.name, "support");
    }

    #[tokio::test]
    async fn test_check_trait_form() {
        let guardrail = OutputGuardrail::new(MaxLength(3)).with_name("short");
        let result = guardrail
            .run(&RunContext::new(), &Arc::new(Agent::new("a")), &json!("toolong"))
            .await
            .unwrap();
        assert!(result.is_triggered());
        assert_eq!(result.guardrail.name(), "short");
    }

    #[tokio::test]
    async fn test_unbound_function_fails() {
        let guardrail = OutputGuardrail::new(GuardrailFunction::<Value>::unbound("nope"));
        let err = guardrail
            .run(&RunContext::new(), &Arc::new(Agent::new("a")), &json!(null))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_name_defaults_to_function_identifier() {
        assert_eq!(OutputGuardrail::new(no_email).name(), "no_email");
        assert_eq!(OutputGuardrail::new(async_no_email).name(), "async_no_email");
    }
}
