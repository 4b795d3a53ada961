//! Shorthand constructors for guardrails.
//!
//! Each kind has a bare form that wraps a function immediately, and a
//! two-stage form that takes an optional name first:
//!
//! ```rust,ignore
//! let a = input_guardrail(no_homework);
//! let b = input_guardrail_with(Some("homework")).wrap(no_homework);
//! ```
//!
//! Both are equivalent to building the guardrail by hand.

use std::marker::PhantomData;

use super::{
    FactCheckingGuardrail, InputGuardrail, IntoFactCheckingGuardrailFunction,
    IntoInputGuardrailFunction, IntoOutputGuardrailFunction, OutputGuardrail,
};

/// Second stage of a named guardrail constructor; see the module docs.
#[derive(Debug, Clone)]
pub struct GuardrailDecorator<K> {
    name: Option<String>,
    kind: PhantomData<fn() -> K>,
}

impl<K> GuardrailDecorator<K> {
    fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_owned),
            kind: PhantomData,
        }
    }
}

impl GuardrailDecorator<InputGuardrail> {
    /// Wrap `function` into an input guardrail.
    #[must_use]
    pub fn wrap<M>(self, function: impl IntoInputGuardrailFunction<M>) -> InputGuardrail {
        let guardrail = InputGuardrail::new(function);
        match self.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }
}

impl GuardrailDecorator<OutputGuardrail> {
    /// Wrap `function` into an output guardrail.
    #[must_use]
    pub fn wrap<M>(self, function: impl IntoOutputGuardrailFunction<M>) -> OutputGuardrail {
        let guardrail = OutputGuardrail::new(function);
        match self.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }
}

impl GuardrailDecorator<FactCheckingGuardrail> {
    /// Wrap `function` into a fact-checking guardrail.
    #[must_use]
    pub fn wrap<M>(
        self,
        function: impl IntoFactCheckingGuardrailFunction<M>,
    ) -> FactCheckingGuardrail {
        let guardrail = FactCheckingGuardrail::new(function);
        match self.name {
            Some(name) => guardrail.with_name(name),
            None => guardrail,
        }
    }
}

/// Turn a function into an unnamed input guardrail.
#[must_use]
pub fn input_guardrail<M>(function: impl IntoInputGuardrailFunction<M>) -> InputGuardrail {
    InputGuardrail::new(function)
}

/// Start a named input guardrail; finish with [`GuardrailDecorator::wrap`].
#[must_use]
pub fn input_guardrail_with(name: Option<&str>) -> GuardrailDecorator<InputGuardrail> {
    GuardrailDecorator::new(name)
}

/// Turn a function into an unnamed output guardrail.
#[must_use]
pub fn output_guardrail<M>(function: impl IntoOutputGuardrailFunction<M>) -> OutputGuardrail {
    OutputGuardrail::new(function)
}

/// Start a named output guardrail; finish with [`GuardrailDecorator::wrap`].
#[must_use]
pub fn output_guardrail_with(name: Option<&str>) -> GuardrailDecorator<OutputGuardrail> {
    GuardrailDecorator::new(name)
}

/// Turn a function into an unnamed fact-checking guardrail.
#[must_use]
pub fn fact_checking_guardrail<M>(
    function: impl IntoFactCheckingGuardrailFunction<M>,
) -> FactCheckingGuardrail {
    FactCheckingGuardrail::new(function)
}

/// Start a named fact-checking guardrail; finish with
/// [`GuardrailDecorator::wrap`].
#[must_use]
pub fn fact_checking_guardrail_with(
    name: Option<&str>,
) -> GuardrailDecorator<FactCheckingGuardrail> {
    GuardrailDecorator::new(name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;
    use crate::agent::{Agent, AgentInput};
    use crate::context::RunContext;
    use crate::error::Result;
    use crate::guardrail::GuardrailOutput;

    fn topic_check(_: &RunContext, _: &Agent, _: &AgentInput) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::pass_with_info("on topic"))
    }

    async fn tone_check(_: RunContext, _: Arc<Agent>, _: Value) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::tripwire(json!({ "tone": "rude" })))
    }

    fn source_check(_: &RunContext, _: &Agent, _: &Value, _: &AgentInput) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::pass())
    }

    #[test]
    fn test_bare_form() {
        assert_eq!(input_guardrail(topic_check).name(), "topic_check");
        assert_eq!(output_guardrail(tone_check).name(), "tone_check");
        assert_eq!(fact_checking_guardrail(source_check).name(), "source_check");
    }

    #[test]
    fn test_named_form() {
        assert_eq!(input_guardrail_with(Some("topic")).wrap(topic_check).name(), "topic");
        assert_eq!(output_guardrail_with(Some("tone")).wrap(tone_check).name(), "tone");
        assert_eq!(
            fact_checking_guardrail_with(Some("sources")).wrap(source_check).name(),
            "sources"
        );
        assert_eq!(input_guardrail_with(None).wrap(topic_check).name(), "topic_check");
    }

    #[tokio::test]
    async fn test_decorated_equals_manual() {
        let ctx = RunContext::new();
        let agent = Arc::new(Agent::new("a"));
        let output = json!("hi");

        let decorated = output_guardrail_with(Some("tone"))
            .wrap(tone_check)
            .run(&ctx, &agent, &output)
            .await
            .unwrap();
        let manual = OutputGuardrail::new(tone_check)
            .with_name("tone")
            .run(&ctx, &agent, &output)
            .await
            .unwrap();

        assert_eq!(decorated.output, manual.output);
        assert_eq!(decorated.guardrail.name(), manual.guardrail.name());
    }
}
