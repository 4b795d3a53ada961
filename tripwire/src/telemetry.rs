//! Response spans for model calls, built on the `tracing` ecosystem.
//!
//! Every model call runs inside one [`ResponseSpan`]. The span is a regular
//! `tracing` span named `response`, so any subscriber sees it, and it also
//! collects a [`ResponseSpanData`] record that is handed to an optional
//! [`TraceProcessor`] when the span ends.
//!
//! A span ends exactly once: explicitly through [`ResponseSpan::finish`], or
//! implicitly when it is dropped. Dropping covers early returns, `?`, and a
//! stream consumer that stops pulling events.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Basic: just initialize a tracing subscriber
//! tracing_subscriber::fmt::init();
//!
//! // Collect finished spans in memory:
//! let collector = Arc::new(SpanCollector::default());
//! let model = OpenAIResponsesModel::new("gpt-4o", client).with_processor(collector.clone());
//! ```

use std::env;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::field::Empty;
use tracing::{Span, debug, info_span};
use uuid::Uuid;

use crate::usage::Usage;

/// Environment variable that suppresses model data in debug logs.
pub const DONT_LOG_MODEL_DATA_ENV: &str = "AGENTS_DONT_LOG_MODEL_DATA";

/// Returns `true` if model inputs and outputs must not appear in logs.
///
/// Read once from [`DONT_LOG_MODEL_DATA_ENV`]; `1` or `true` enables it.
#[must_use]
pub fn dont_log_model_data() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        env::var(DONT_LOG_MODEL_DATA_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How much of a model call is traced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTracing {
    /// No span is recorded.
    Disabled,
    /// Spans include inputs, outputs and full error messages.
    #[default]
    Enabled,
    /// Spans are recorded without model data.
    EnabledWithoutData,
}

impl ModelTracing {
    /// Returns `true` if no span should be recorded.
    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Returns `true` if spans may carry model inputs and outputs.
    #[must_use]
    pub const fn include_data(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// An error recorded on a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanError {
    /// Short description of what failed.
    pub message: String,
    /// Structured details.
    pub data: Value,
}

impl SpanError {
    /// Create a span error.
    #[must_use]
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// What a response span recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseSpanData {
    /// Unique span id.
    pub span_id: Uuid,
    /// Model input, when data inclusion is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Raw provider response, when data inclusion is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Provider response id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Token usage of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// The error, if the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SpanError>,
    /// Wall time from open to finish.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

/// Receives response spans as they open and close.
pub trait TraceProcessor: Send + Sync {
    /// Called once when a span opens.
    fn on_span_start(&self, _span: &ResponseSpanData) {}

    /// Called once when a span ends.
    fn on_span_end(&self, span: &ResponseSpanData);
}

/// A [`TraceProcessor`] that keeps finished spans in memory.
#[derive(Debug, Default)]
pub struct SpanCollector {
    spans: Mutex<Vec<ResponseSpanData>>,
}

impl SpanCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished spans, oldest first.
    #[must_use]
    pub fn spans(&self) -> Vec<ResponseSpanData> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TraceProcessor for SpanCollector {
    fn on_span_end(&self, span: &ResponseSpanData) {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(span.clone());
    }
}

/// A scoped span covering one model request or stream.
pub struct ResponseSpan {
    data: ResponseSpanData,
    span: Span,
    disabled: bool,
    processor: Option<Arc<dyn TraceProcessor>>,
    start: Instant,
    finished: bool,
}

impl ResponseSpan {
    /// Open a span. A disabled span records nothing and notifies no one.
    #[must_use]
    pub fn open(disabled: bool, processor: Option<Arc<dyn TraceProcessor>>) -> Self {
        let data = ResponseSpanData {
            span_id: Uuid::new_v4(),
            ..ResponseSpanData::default()
        };
        let span = if disabled {
            Span::none()
        } else {
            info_span!(
                "response",
                span_id = %data.span_id,
                response_id = Empty,
                input_tokens = Empty,
                output_tokens = Empty,
                total_tokens = Empty,
                error = Empty,
            )
        };
        if !disabled && let Some(processor) = &processor {
            processor.on_span_start(&data);
        }
        Self {
            data,
            span,
            disabled,
            processor,
            start: Instant::now(),
            finished: false,
        }
    }

    /// The underlying `tracing` span, for instrumenting futures.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Returns `true` if this span records nothing.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// What has been recorded so far.
    #[must_use]
    pub const fn data(&self) -> &ResponseSpanData {
        &self.data
    }

    /// Record an error.
    pub fn set_error(&mut self, error: SpanError) {
        self.data.error = Some(error);
    }

    /// Record the model input.
    pub fn set_input(&mut self, input: Value) {
        self.data.input = Some(input);
    }

    /// Record the raw provider response.
    pub fn set_response(&mut self, response: Value) {
        self.data.response = Some(response);
    }

    /// Record the provider response id.
    pub fn set_response_id(&mut self, response_id: impl Into<String>) {
        self.data.response_id = Some(response_id.into());
    }

    /// Record token usage.
    pub fn set_usage(&mut self, usage: Usage) {
        self.data.usage = Some(usage);
    }

    /// End the span now.
    pub fn finish(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.disabled {
            return;
        }

        self.data.duration = Some(self.start.elapsed());
        if let Some(id) = &self.data.response_id {
            self.span.record("response_id", id.as_str());
        }
        if let Some(usage) = &self.data.usage {
            self.span.record("input_tokens", usage.input_tokens);
            self.span.record("output_tokens", usage.output_tokens);
            self.span.record("total_tokens", usage.total_tokens);
        }
        if let Some(error) = &self.data.error {
            self.span.record("error", error.message.as_str());
        }
        self.span.in_scope(|| {
            debug!(
                duration_ms = self.data.duration.map_or(0, |d| d.as_millis()),
                failed = self.data.error.is_some(),
                "response_span_finished"
            );
        });

        if let Some(processor) = &self.processor {
            processor.on_span_end(&self.data);
        }
    }
}

impl Drop for ResponseSpan {
    fn drop(&mut self) {
        self.end();
    }
}

impl fmt::Debug for ResponseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSpan")
            .field("data", &self.data)
            .field("disabled", &self.disabled)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
