//! Model adapter for the `OpenAI` Responses API.
//!
//! [`OpenAIResponsesModel`] builds one [`ResponseCreateParams`] per call,
//! sends it through the injected [`ResponsesClient`], and wraps the whole
//! exchange in a [`ResponseSpan`]. Errors are recorded on the span and
//! returned unchanged; nothing is retried here.

use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use tracing::{Instrument, debug, error, instrument};

use crate::error::{Error, Result};
use crate::omit::Omittable;
use crate::providers::{Model, ModelRequest, ModelResponse, ResponseStream, ResponsesClient};
use crate::telemetry::{
    ModelTracing, ResponseSpan, SpanError, TraceProcessor, dont_log_model_data,
};
use crate::usage::Usage;

use super::DEFAULT_MODEL;
use super::converter::Converter;
use super::types::{Response, ResponseCreateParams, ResponseUsage};

const GET_RESPONSE_ERROR: &str = "Error getting response";
const STREAM_RESPONSE_ERROR: &str = "Error streaming response";

/// A [`Model`] backed by the Responses API.
#[derive(Clone)]
pub struct OpenAIResponsesModel {
    model: String,
    client: Arc<dyn ResponsesClient>,
    processor: Option<Arc<dyn TraceProcessor>>,
}

impl std::fmt::Debug for OpenAIResponsesModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIResponsesModel")
            .field("model", &self.model)
            .field("has_processor", &self.processor.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenAIResponsesModel {
    /// Create a model that sends requests through `client`.
    #[must_use]
    pub fn new(model: impl Into<String>, client: Arc<dyn ResponsesClient>) -> Self {
        Self {
            model: model.into(),
            client,
            processor: None,
        }
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> OpenAIResponsesModelBuilder {
        OpenAIResponsesModelBuilder::default()
    }

    /// Deliver finished response spans to `processor`.
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn TraceProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Build the wire request for `request`.
    ///
    /// Unset settings stay unset on the wire. `parallel_tool_calls` is sent
    /// as `true` only when it is enabled and the request has tools, and as
    /// `false` only when it is explicitly disabled. Penalty settings have no
    /// Responses API field and are not sent.
    ///
    /// # Errors
    ///
    /// Returns the converter's error for unknown tools or for more than one
    /// computer tool.
    pub fn build_params(
        &self,
        request: &ModelRequest<'_>,
        stream: bool,
    ) -> Result<ResponseCreateParams> {
        let settings = request.model_settings;
        let converted = Converter::convert_tools(request.tools, request.handoffs)?;

        let parallel_tool_calls = match settings.parallel_tool_calls {
            Some(true) if !request.tools.is_empty() => Omittable::Explicit(true),
            Some(false) => Omittable::Explicit(false),
            _ => Omittable::Unset,
        };

        Ok(ResponseCreateParams {
            instructions: request.system_instructions.map(str::to_owned).into(),
            model: self.model.clone(),
            input: request.input.to_input_list(),
            include: converted.includes,
            tools: converted.tools,
            temperature: settings.temperature.into(),
            top_p: settings.top_p.into(),
            truncation: settings.truncation.into(),
            max_output_tokens: settings.max_tokens.into(),
            tool_choice: Converter::convert_tool_choice(settings.tool_choice.as_deref()),
            parallel_tool_calls,
            stream,
            text: Converter::get_response_format(request.output_schema),
            store: settings.store.into(),
            reasoning: settings.reasoning.clone().into(),
            metadata: settings.metadata.clone().into(),
        })
    }

    fn log_request(&self, params: &ResponseCreateParams) {
        if dont_log_model_data() {
            debug!("Calling LLM");
            return;
        }
        debug!(
            model = %self.model,
            input = %json_for_log(&params.input),
            tools = %json_for_log(&params.tools),
            stream = params.stream,
            tool_choice = %json_for_log(&params.tool_choice),
            response_format = %json_for_log(&params.text),
            "Calling LLM"
        );
    }

    async fn fetch_response(&self, request: &ModelRequest<'_>) -> Result<Response> {
        let params = self.build_params(request, false)?;
        self.log_request(&params);
        self.client.create(&params).await
    }
}

fn json_for_log<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn usage_from(usage: Option<ResponseUsage>) -> Usage {
    usage.map_or_else(Usage::default, |u| {
        Usage::single_request(u.input_tokens, u.output_tokens, u.total_tokens)
    })
}

fn span_error(message: &str, err: &Error, tracing: ModelTracing) -> SpanError {
    let detail = if tracing.include_data() {
        err.to_string()
    } else {
        err.kind_name().to_owned()
    };
    SpanError::new(message, json!({ "error": detail }))
}

fn record_response(span: &mut ResponseSpan, response: &Response, tracing: ModelTracing) {
    span.set_usage(usage_from(response.usage));
    span.set_response_id(response.id.clone());
    if tracing.include_data()
        && let Ok(value) = serde_json::to_value(response)
    {
        span.set_response(value);
    }
}

#[async_trait]
impl Model for OpenAIResponsesModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn get_response(
        &self,
        request: ModelRequest<'_>,
        tracing: ModelTracing,
    ) -> Result<ModelResponse> {
        let mut span = ResponseSpan::open(tracing.is_disabled(), self.processor.clone());

        let result = self
            .fetch_response(&request)
            .instrument(span.span().clone())
            .await;

        match result {
            Ok(response) => {
                if dont_log_model_data() {
                    debug!("LLM responded");
                } else {
                    debug!(output = %json_for_log(&response.output), "LLM responded");
                }
                if tracing.include_data() {
                    span.set_input(Value::Array(request.input.to_input_list()));
                }
                record_response(&mut span, &response, tracing);
                span.finish();
                Ok(ModelResponse {
                    usage: usage_from(response.usage),
                    output: response.output,
                    response_id: Some(response.id),
                })
            }
            Err(err) => {
                span.set_error(span_error(GET_RESPONSE_ERROR, &err, tracing));
                error!(
                    request_id = err.request_id().unwrap_or_default(),
                    error = %err,
                    "{GET_RESPONSE_ERROR}"
                );
                span.finish();
                Err(err)
            }
        }
    }

    fn stream_response(&self, request: ModelRequest<'_>, tracing: ModelTracing) -> ResponseStream {
        let mut span = ResponseSpan::open(tracing.is_disabled(), self.processor.clone());
        let input = tracing
            .include_data()
            .then(|| Value::Array(request.input.to_input_list()));
        let params = self.build_params(&request, true);
        if let Ok(params) = &params {
            let _entered = span.span().enter();
            self.log_request(params);
        }
        let client = Arc::clone(&self.client);

        Box::pin(stream! {
            let mut span = span;
            let opened = match params {
                Ok(params) => client.create_stream(&params).instrument(span.span().clone()).await,
                Err(err) => Err(err),
            };
            let mut events = match opened {
                Ok(events) => events,
                Err(err) => {
                    span.set_error(span_error(STREAM_RESPONSE_ERROR, &err, tracing));
                    error!(error = %err, "{STREAM_RESPONSE_ERROR}");
                    yield Err(err);
                    return;
                }
            };

            let mut final_response = None;
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        if let Some(response) = event.completed_response() {
                            final_response = Some(response.clone());
                        }
                        yield Ok(event);
                    }
                    Err(err) => {
                        span.set_error(span_error(STREAM_RESPONSE_ERROR, &err, tracing));
                        error!(error = %err, "{STREAM_RESPONSE_ERROR}");
                        yield Err(err);
                        return;
                    }
                }
            }

            if let Some(input) = input {
                span.set_input(input);
            }
            if let Some(response) = &final_response {
                record_response(&mut span, response, tracing);
            }
            span.finish();
        })
    }
}

/// Builder for [`OpenAIResponsesModel`].
#[derive(Default)]
pub struct OpenAIResponsesModelBuilder {
    model: Option<String>,
    client: Option<Arc<dyn ResponsesClient>>,
    processor: Option<Arc<dyn TraceProcessor>>,
}

impl OpenAIResponsesModelBuilder {
    /// Set the model name. Defaults to [`DEFAULT_MODEL`].
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the provider client.
    #[must_use]
    pub fn client(mut self, client: Arc<dyn ResponsesClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the span processor.
    #[must_use]
    pub fn processor(mut self, processor: Arc<dyn TraceProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no client was set.
    pub fn build(self) -> Result<OpenAIResponsesModel> {
        let client = self
            .client
            .ok_or_else(|| Error::configuration("OpenAIResponsesModel requires a client"))?;
        Ok(OpenAIResponsesModel {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            client,
            processor: self.processor,
        })
    }
}
