//! Run-scoped context handed to guardrails.

use std::any::Any;
use std::sync::Arc;

use crate::usage::Usage;

/// Context shared by everything that runs on behalf of one agent run.
///
/// The user state is opaque to this crate; guardrails downcast it with
/// [`state`](Self::state). Cloning is cheap: the state sits behind an `Arc`.
#[derive(Clone)]
pub struct RunContext {
    state: Option<Arc<dyn Any + Send + Sync>>,
    /// Usage accumulated so far in the run.
    pub usage: Usage,
}

impl RunContext {
    /// Create a context with no user state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: None,
            usage: Usage::default(),
        }
    }

    /// Attach user state.
    #[must_use]
    pub fn with_state<T: Any + Send + Sync>(mut self, state: T) -> Self {
        self.state = Some(Arc::new(state));
        self
    }

    /// Borrow the user state as `T`, if it has that type.
    #[must_use]
    pub fn state<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.state.as_deref()?.downcast_ref::<T>()
    }

    /// Add the usage of one model call.
    pub fn add_usage(&mut self, usage: Usage) {
        self.usage += usage;
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("has_state", &self.state.is_some())
            .field("usage", &self.usage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_state_downcast() {
        let ctx = RunContext::new().with_state(Tenant("acme"));
        assert_eq!(ctx.state::<Tenant>(), Some(&Tenant("acme")));
        assert!(ctx.state::<String>().is_none());
        assert!(RunContext::default().state::<Tenant>().is_none());
    }

    #[test]
    fn test_add_usage() {
        let mut ctx = RunContext::new();
        ctx.add_usage(Usage::single_request(3, 4, 7));
        ctx.add_usage(Usage::single_request(1, 1, 2));
        assert_eq!(ctx.usage.requests, 2);
        assert_eq!(ctx.usage.total_tokens, 9);
    }
}
