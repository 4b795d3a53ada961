#![cfg_attr(docsrs, feature(doc_cfg))]
//! Tripwire is the guardrail and model layer of an LLM agent runtime.
//!
//! It provides two things a run loop builds on:
//!
//! - **Guardrails** ([`guardrail`]): checks over an agent's input, its final
//!   output, or both, written as sync functions, async functions, or trait
//!   objects. A check that trips its wire halts the run.
//! - **A Responses API model** ([`providers::openai`]): converts tools,
//!   handoffs and output schemas to wire shapes, calls the provider through
//!   an injected client, and records every call on a [`telemetry`] span.
//!
//! The run loop itself, tool execution and provider retries live elsewhere.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tripwire::prelude::*;
//!
//! fn no_secrets(_: &RunContext, _: &Agent, input: &AgentInput) -> Result<GuardrailOutput> {
//!     let text = serde_json::to_string(input)?;
//!     Ok(if text.contains("password") {
//!         GuardrailOutput::tripwire("mentions a password")
//!     } else {
//!         GuardrailOutput::pass()
//!     })
//! }
//!
//! let agent = Arc::new(Agent::new("support").input_guardrail(InputGuardrail::new(no_secrets)));
//! agent.run_input_guardrails(&RunContext::new(), &"hello".into()).await?;
//! ```

pub mod agent;
pub mod context;
pub mod error;
pub mod guardrail;
pub mod handoff;
pub mod model_settings;
pub mod omit;
pub mod output_schema;
pub mod prelude;
pub mod providers;
pub mod telemetry;
pub mod tool;
pub mod usage;

pub use error::{Error, Result};
