//! `OpenAI` Responses API provider.
//!
//! - [`OpenAIClient`]: the HTTP client, injected into every model
//! - [`Converter`]: tools, handoffs and output schemas to wire shapes
//! - [`OpenAIResponsesModel`]: the [`Model`] adapter
//! - [`OpenAIProvider`]: hands out models that share one client

mod client;
mod converter;
mod responses;
pub mod types;

pub use client::{OPENAI_API_BASE_URL, OpenAIClient, OpenAIClientBuilder, user_agent};
pub use converter::{ConvertedTools, Converter, FINAL_OUTPUT_FORMAT_NAME};
pub use responses::{OpenAIResponsesModel, OpenAIResponsesModelBuilder};

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{Model, ModelProvider, ResponsesClient};
use crate::telemetry::TraceProcessor;

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// A [`ModelProvider`] for the Responses API.
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Arc<dyn ResponsesClient>,
    processor: Option<Arc<dyn TraceProcessor>>,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("has_processor", &self.processor.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenAIProvider {
    /// Create a provider whose models all use `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ResponsesClient>) -> Self {
        Self {
            client,
            processor: None,
        }
    }

    /// Deliver finished response spans of every model to `processor`.
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn TraceProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }
}

impl ModelProvider for OpenAIProvider {
    fn get_model(&self, model_name: Option<&str>) -> Result<Arc<dyn Model>> {
        let mut model = OpenAIResponsesModel::new(
            model_name.unwrap_or(DEFAULT_MODEL),
            Arc::clone(&self.client),
        );
        if let Some(processor) = &self.processor {
            model = model.with_processor(Arc::clone(processor));
        }
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::types::Response;
    use super::*;
    use crate::agent::AgentInput;
    use crate::model_settings::ModelSettings;
    use crate::providers::{MockResponsesClient, ModelRequest};
    use crate::telemetry::{ModelTracing, SpanCollector};
    use serde_json::json;

    #[test]
    fn test_default_model_name() {
        let provider = OpenAIProvider::new(Arc::new(MockResponsesClient::new()));
        assert_eq!(provider.get_model(None).unwrap().model_id(), "gpt-4o");
        assert_eq!(
            provider.get_model(Some("o3-mini")).unwrap().model_id(),
            "o3-mini"
        );
    }

    #[tokio::test]
    async fn test_models_share_client_and_processor() {
        let client = Arc::new(
            MockResponsesClient::new()
                .with_response(Response {
                    id: "a".to_owned(),
                    model: None,
                    status: None,
                    output: vec![json!({"type": "message"})],
                    usage: None,
                    error: None,
                })
                .with_response(Response {
                    id: "b".to_owned(),
                    model: None,
                    status: None,
                    output: vec![],
                    usage: None,
                    error: None,
                }),
        );
        let collector = Arc::new(SpanCollector::new());
        let provider = OpenAIProvider::new(client.clone()).with_processor(collector.clone());
        let input = AgentInput::from("hi");
        let settings = ModelSettings::default();

        for name in [None, Some("gpt-4o-mini")] {
            provider
                .get_model(name)
                .unwrap()
                .get_response(ModelRequest::new(&input, &settings), ModelTracing::Enabled)
                .await
                .unwrap();
        }

        let models: Vec<String> = client.requests().into_iter().map(|p| p.model).collect();
        assert_eq!(models, vec!["gpt-4o", "gpt-4o-mini"]);
        assert_eq!(collector.spans().len(), 2);
    }
}
