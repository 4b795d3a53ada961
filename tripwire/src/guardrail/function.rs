//! The callable wrapped by a guardrail.
//!
//! A guardrail function is either synchronous (borrowed arguments, immediate
//! result) or asynchronous (owned arguments, boxed `'static` future). Both
//! are stored behind one [`GuardrailFunction`] and awaited uniformly by
//! [`invoke`](GuardrailFunction::invoke), so callers never see which one ran.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::agent::Agent;
use crate::context::RunContext;
use crate::error::{Error, Result};

use super::GuardrailOutput;

type SyncFn<P> = dyn Fn(&RunContext, &Agent, &P) -> Result<GuardrailOutput> + Send + Sync;

type AsyncFn<P> =
    dyn Fn(RunContext, Arc<Agent>, P) -> BoxFuture<'static, Result<GuardrailOutput>> + Send + Sync;

enum Callable<P> {
    Sync(Arc<SyncFn<P>>),
    Async(Arc<AsyncFn<P>>),
    Unbound,
}

impl<P> Clone for Callable<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
            Self::Unbound => Self::Unbound,
        }
    }
}

/// A guardrail check over payload `P`, plus the identifier it was built from.
pub struct GuardrailFunction<P> {
    identifier: String,
    callable: Callable<P>,
}

impl<P> Clone for GuardrailFunction<P> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            callable: self.callable.clone(),
        }
    }
}

impl<P: Send + 'static> GuardrailFunction<P> {
    /// Wrap a synchronous check.
    pub fn from_sync<F>(identifier: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RunContext, &Agent, &P) -> Result<GuardrailOutput> + Send + Sync + 'static,
    {
        Self {
            identifier: identifier.into(),
            callable: Callable::Sync(Arc::new(f)),
        }
    }

    /// Wrap an asynchronous check.
    pub fn from_async<F>(identifier: impl Into<String>, f: F) -> Self
    where
        F: Fn(RunContext, Arc<Agent>, P) -> BoxFuture<'static, Result<GuardrailOutput>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            identifier: identifier.into(),
            callable: Callable::Async(Arc::new(f)),
        }
    }

    /// A reference to a function that cannot be invoked.
    ///
    /// Produced when a guardrail is assembled from configuration naming a
    /// function nobody registered. [`invoke`](Self::invoke) always fails.
    pub fn unbound(reference: impl Into<String>) -> Self {
        Self {
            identifier: reference.into(),
            callable: Callable::Unbound,
        }
    }

    /// The function's own identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns `true` if the function can be invoked.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        !matches!(self.callable, Callable::Unbound)
    }

    /// Invoke the function once and resolve its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the function is not callable, or
    /// whatever error the function itself returns.
    pub async fn invoke(
        &self,
        context: &RunContext,
        agent: &Arc<Agent>,
        payload: P,
    ) -> Result<GuardrailOutput> {
        match &self.callable {
            Callable::Sync(f) => f(context, agent.as_ref(), &payload),
            Callable::Async(f) => f(context.clone(), Arc::clone(agent), payload).await,
            Callable::Unbound => Err(Error::configuration(format!(
                "Guardrail function must be callable, got {}",
                self.identifier
            ))),
        }
    }
}

impl<P> fmt::Debug for GuardrailFunction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.callable {
            Callable::Sync(_) => "sync",
            Callable::Async(_) => "async",
            Callable::Unbound => "unbound",
        };
        f.debug_struct("GuardrailFunction")
            .field("identifier", &self.identifier)
            .field("kind", &kind)
            .finish()
    }
}

/// Marker for synchronous guardrail functions.
#[derive(Debug)]
pub struct SyncMarker;

/// Marker for asynchronous guardrail functions.
#[derive(Debug)]
pub struct AsyncMarker;

/// Marker for types implementing a guardrail check trait.
#[derive(Debug)]
pub struct CheckMarker;

/// The identifier of a Rust function or type: the last path segment of its
/// type name.
pub(crate) fn identifier_of<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    fn always_pass(_: &RunContext, _: &Agent, _: &String) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::pass())
    }

    fn identifier_of_val<T>(_: &T) -> String {
        identifier_of::<T>()
    }

    #[test]
    fn test_identifier_of() {
        assert_eq!(identifier_of_val(&always_pass), "always_pass");
        assert_eq!(identifier_of::<GuardrailOutput>(), "GuardrailOutput");
        assert_eq!(identifier_of::<Vec<String>>(), "Vec");
    }

    #[tokio::test]
    async fn test_invoke_sync_and_async() {
        let ctx = RunContext::new();
        let agent = Arc::new(Agent::new("a"));

        let sync_fn = GuardrailFunction::from_sync("always_pass", always_pass);
        let out = sync_fn.invoke(&ctx, &agent, "x".to_owned()).await.unwrap();
        assert!(!out.tripwire_triggered);

        let async_fn = GuardrailFunction::from_async("echo", |_, _, p: String| {
            async move { Ok(GuardrailOutput::tripwire(json!({ "payload": p }))) }.boxed()
        });
        let out = async_fn.invoke(&ctx, &agent, "x".to_owned()).await.unwrap();
        assert!(out.tripwire_triggered);
        assert_eq!(out.output_info, json!({"payload": "x"}));
    }

    #[tokio::test]
    async fn test_invoke_unbound() {
        let f = GuardrailFunction::<String>::unbound("not_a_function");
        assert!(!f.is_callable());
        let err = f
            .invoke(&RunContext::new(), &Arc::new(Agent::new("a")), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("not_a_function"));
    }
}
