//! Unified error types for the tripwire crate.
//!
//! This module provides one error hierarchy covering:
//! - configuration mistakes (non-invocable guardrails, missing clients)
//! - tool conversion failures (unknown tool kinds, duplicate computer tools)
//! - provider failures (request and mid-stream)
//! - guardrail tripwires raised by the group runners

use crate::guardrail::{FactCheckingGuardrailResult, InputGuardrailResult, OutputGuardrailResult};

/// Result type alias for tripwire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tripwire crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The crate was used incorrectly, e.g. a guardrail without a callable
    /// function or a model without a client.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A tool kind the converter has no wire shape for.
    #[error("Unknown tool type: {type_name}")]
    UnknownTool {
        /// The runtime type name of the rejected tool.
        type_name: String,
    },

    /// More than one computer tool was supplied for a single request.
    #[error("You can only provide one computer tool. Got {count}")]
    MultipleComputerTools {
        /// How many computer tools were found.
        count: usize,
    },

    /// A non-streaming provider call failed.
    #[error("Provider request failed{}: {message}{}", status_suffix(.status), request_id_suffix(.request_id))]
    ProviderRequest {
        /// HTTP status returned by the provider, if any.
        status: Option<u16>,
        /// The provider's error message.
        message: String,
        /// Provider-issued request identifier for support correlation.
        request_id: Option<String>,
    },

    /// The provider stream failed after it was opened.
    #[error("Provider stream error: {0}")]
    ProviderStream(String),

    /// An input guardrail tripwire was triggered.
    #[error("Input guardrail '{}' tripwire triggered", .0.guardrail.name())]
    InputGuardrailTriggered(Box<InputGuardrailResult>),

    /// An output guardrail tripwire was triggered.
    #[error("Output guardrail '{}' tripwire triggered", .0.guardrail.name())]
    OutputGuardrailTriggered(Box<OutputGuardrailResult>),

    /// A fact-checking guardrail tripwire was triggered.
    #[error("Fact-checking guardrail '{}' tripwire triggered", .0.guardrail.name())]
    FactCheckingGuardrailTriggered(Box<FactCheckingGuardrailResult>),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error raised by user code, such as a guardrail function.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

fn request_id_suffix(request_id: &Option<String>) -> String {
    request_id
        .as_ref()
        .map(|id| format!(" (request_id: {id})"))
        .unwrap_or_default()
}

impl Error {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an unknown tool error for the given type name.
    #[must_use]
    pub fn unknown_tool(type_name: impl Into<String>) -> Self {
        Self::UnknownTool {
            type_name: type_name.into(),
        }
    }

    /// Create a provider request error.
    #[must_use]
    pub fn provider_request(
        status: Option<u16>,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self::ProviderRequest {
            status,
            message: message.into(),
            request_id,
        }
    }

    /// Create a provider stream error.
    #[must_use]
    pub fn provider_stream(msg: impl Into<String>) -> Self {
        Self::ProviderStream(msg.into())
    }

    /// Wrap an arbitrary error raised by user code.
    #[must_use]
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Other(err.into())
    }

    /// The taxonomy name of this error.
    ///
    /// Spans record this instead of the full message when data inclusion
    /// is disabled.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::UnknownTool { .. } => "UnknownToolError",
            Self::MultipleComputerTools { .. } => "MultipleComputerToolsError",
            Self::ProviderRequest { .. } => "ProviderRequestError",
            Self::ProviderStream(_) => "ProviderStreamError",
            Self::InputGuardrailTriggered(_) => "InputGuardrailTripwireTriggered",
            Self::OutputGuardrailTriggered(_) => "OutputGuardrailTripwireTriggered",
            Self::FactCheckingGuardrailTriggered(_) => "FactCheckingGuardrailTripwireTriggered",
            Self::Json(_) => "JsonError",
            Self::Other(_) => "Error",
        }
    }

    /// The provider request identifier, when the provider returned one.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ProviderRequest { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is a guardrail tripwire.
    #[must_use]
    pub const fn is_tripwire(&self) -> bool {
        matches!(
            self,
            Self::InputGuardrailTriggered(_)
                | Self::OutputGuardrailTriggered(_)
                | Self::FactCheckingGuardrailTriggered(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_owned()
        } else if err.is_connect() {
            format!("Connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::ProviderRequest {
            status: err.status().map(|s| s.as_u16()),
            message,
            request_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            Error::configuration("bad").kind_name(),
            "ConfigurationError"
        );
        assert_eq!(Error::unknown_tool("Foo").kind_name(), "UnknownToolError");
        assert_eq!(
            Error::MultipleComputerTools { count: 2 }.kind_name(),
            "MultipleComputerToolsError"
        );
        assert_eq!(
            Error::provider_stream("eof").kind_name(),
            "ProviderStreamError"
        );
    }

    #[test]
    fn test_provider_request_display() {
        let err = Error::provider_request(Some(429), "slow down", Some("req_123".into()));
        assert_eq!(
            err.to_string(),
            "Provider request failed (429): slow down (request_id: req_123)"
        );
        assert_eq!(err.request_id(), Some("req_123"));

        let err = Error::provider_request(None, "boom", None);
        assert_eq!(err.to_string(), "Provider request failed: boom");
        assert_eq!(err.request_id(), None);
    }

    #[test]
    fn test_multiple_computer_tools_display() {
        let err = Error::MultipleComputerTools { count: 3 };
        assert_eq!(
            err.to_string(),
            "You can only provide one computer tool. Got 3"
        );
    }

    #[test]
    fn test_other_is_transparent() {
        let err = Error::other("classifier offline");
        assert_eq!(err.to_string(), "classifier offline");
        assert!(!err.is_tripwire());
    }
}
