//! Model interfaces and the `OpenAI` Responses provider.
//!
//! A [`Model`] turns an agent's current state into one provider request and
//! returns either the whole response or a stream of events. The provider
//! client is always injected: models are built around an
//! `Arc<dyn ResponsesClient>` and never create one on their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tripwire::providers::openai::{OpenAIClient, OpenAIProvider};
//! use tripwire::providers::{ModelProvider, ModelRequest};
//!
//! let client = Arc::new(OpenAIClient::from_env()?);
//! let provider = OpenAIProvider::new(client);
//! let model = provider.get_model(Some("gpt-4o"))?;
//!
//! let response = model
//!     .get_response(ModelRequest::from_agent(&agent, &input), ModelTracing::Enabled)
//!     .await?;
//! println!("{} tokens", response.usage.total_tokens);
//! ```

mod streaming;

pub mod mock;
pub mod openai;

pub use streaming::{SseStreamParser, is_done_marker, parse_sse_data};

pub use mock::MockResponsesClient;
pub use openai::{OpenAIClient, OpenAIProvider, OpenAIResponsesModel};

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::{Agent, AgentInput};
use crate::error::Result;
use crate::handoff::Handoff;
use crate::model_settings::ModelSettings;
use crate::output_schema::AgentOutputSchema;
use crate::telemetry::ModelTracing;
use crate::tool::Tool;
use crate::usage::Usage;
use openai::types::{Response, ResponseCreateParams, ResponseStreamEvent};

/// A finite, single-pass stream of provider events.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<ResponseStreamEvent>> + Send>>;

/// Everything a model needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// System instructions.
    pub system_instructions: Option<&'a str>,
    /// The input for this turn.
    pub input: &'a AgentInput,
    /// Resolved model settings.
    pub model_settings: &'a ModelSettings,
    /// Tools exposed to the model.
    pub tools: &'a [Tool],
    /// Final output type; `None` means plain text.
    pub output_schema: Option<&'a AgentOutputSchema>,
    /// Handoffs, sent as function tools after `tools`.
    pub handoffs: &'a [Handoff],
}

impl<'a> ModelRequest<'a> {
    /// A request with no tools, handoffs or output schema.
    #[must_use]
    pub const fn new(input: &'a AgentInput, model_settings: &'a ModelSettings) -> Self {
        Self {
            system_instructions: None,
            input,
            model_settings,
            tools: &[],
            output_schema: None,
            handoffs: &[],
        }
    }

    /// A request built from an agent's definition.
    #[must_use]
    pub fn from_agent(agent: &'a Agent, input: &'a AgentInput) -> Self {
        Self {
            system_instructions: agent.instructions.as_deref(),
            input,
            model_settings: &agent.model_settings,
            tools: &agent.tools,
            output_schema: agent.output_schema.as_ref(),
            handoffs: &agent.handoffs,
        }
    }

    /// Set the system instructions.
    #[must_use]
    pub const fn system_instructions(mut self, instructions: &'a str) -> Self {
        self.system_instructions = Some(instructions);
        self
    }

    /// Set the tools.
    #[must_use]
    pub const fn tools(mut self, tools: &'a [Tool]) -> Self {
        self.tools = tools;
        self
    }

    /// Set the handoffs.
    #[must_use]
    pub const fn handoffs(mut self, handoffs: &'a [Handoff]) -> Self {
        self.handoffs = handoffs;
        self
    }

    /// Set the output schema.
    #[must_use]
    pub const fn output_schema(mut self, schema: &'a AgentOutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// A normalized model response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Output items in provider order.
    pub output: Vec<Value>,
    /// Token usage of the call.
    pub usage: Usage,
    /// Continuation handle for a later request, when the provider gave one.
    pub response_id: Option<String>,
}

/// A language model reachable through some provider.
#[async_trait]
pub trait Model: Send + Sync {
    /// The model identifier, e.g. `gpt-4o`.
    fn model_id(&self) -> &str;

    /// Make one non-streaming call.
    ///
    /// # Errors
    ///
    /// Returns the provider or conversion error unchanged after recording
    /// it on the response span. Nothing is retried.
    async fn get_response(
        &self,
        request: ModelRequest<'_>,
        tracing: ModelTracing,
    ) -> Result<ModelResponse>;

    /// Make one streaming call.
    ///
    /// Events are forwarded in the order received. The stream ends after
    /// the first error, which is recorded on the response span.
    fn stream_response(&self, request: ModelRequest<'_>, tracing: ModelTracing) -> ResponseStream;
}

/// Looks up models by name.
pub trait ModelProvider: Send + Sync {
    /// Get a model by name, or the provider default for `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot serve the model.
    fn get_model(&self, model_name: Option<&str>) -> Result<Arc<dyn Model>>;
}

/// The provider client handle: issues Responses API calls.
///
/// Implementations must be safe to call from several in-flight requests
/// at once. Models only issue requests and never reconfigure the client.
#[async_trait]
pub trait ResponsesClient: Send + Sync {
    /// Create a response and wait for all of it.
    async fn create(&self, params: &ResponseCreateParams) -> Result<Response>;

    /// Create a response as a stream of events.
    async fn create_stream(&self, params: &ResponseCreateParams) -> Result<ResponseStream>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::FunctionTool;
    use serde_json::json;

    #[test]
    fn test_request_from_agent() {
        let agent = Agent::new("helper")
            .instructions("Be brief.")
            .tool(FunctionTool::new("lookup", "Look up", json!({})))
            .handoff(Handoff::to_agent("billing"));
        let input = AgentInput::from("hi");

        let request = ModelRequest::from_agent(&agent, &input);
        assert_eq!(request.system_instructions, Some("Be brief."));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.handoffs.len(), 1);
        assert!(request.output_schema.is_none());
    }

    #[test]
    fn test_bare_request() {
        let input = AgentInput::from("hi");
        let settings = ModelSettings::default();
        let request = ModelRequest::new(&input, &settings).system_instructions("sys");
        assert_eq!(request.system_instructions, Some("sys"));
        assert!(request.tools.is_empty());
        assert!(request.handoffs.is_empty());
    }
}
