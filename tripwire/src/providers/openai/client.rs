//! `OpenAI` API client implementation.
//!
//! Provides a client for the Responses API, supporting OpenAI's own
//! endpoint as well as compatible proxies.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, instrument};

use super::types::{Response, ResponseCreateParams, ResponseStreamEvent};
use crate::error::{Error, Result};
use crate::providers::streaming::SseStreamParser;
use crate::providers::{ResponseStream, ResponsesClient};

/// Default `OpenAI` API base URL.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_ID_HEADER: &str = "x-request-id";
const ORGANIZATION_HEADER: &str = "openai-organization";
const PROJECT_HEADER: &str = "openai-project";

/// `OpenAI` API client for the Responses API.
///
/// # Example
///
/// ```rust,ignore
/// use tripwire::providers::openai::OpenAIClient;
///
/// // From environment variable OPENAI_API_KEY
/// let client = OpenAIClient::from_env()?;
///
/// // With a custom base URL
/// let client = OpenAIClient::builder()
///     .api_key("sk-...")
///     .base_url("https://my-openai-proxy.com/v1")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
    organization: Option<Arc<str>>,
    project: Option<Arc<str>>,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a client with the given API key and the default base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> OpenAIClientBuilder {
        OpenAIClientBuilder::default()
    }

    /// Create a client from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY` (required): The API key
    /// - `OPENAI_BASE_URL` (optional): Custom base URL
    /// - `OPENAI_ORG_ID` (optional): Organization id
    /// - `OPENAI_PROJECT_ID` (optional): Project id
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            Error::configuration("OPENAI_API_KEY environment variable not set")
        })?;

        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Ok(organization) = std::env::var("OPENAI_ORG_ID") {
            builder = builder.organization(organization);
        }
        if let Ok(project) = std::env::var("OPENAI_PROJECT_ID") {
            builder = builder.project(project);
        }
        builder.build()
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);

        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&user_agent()) {
            headers.insert(USER_AGENT, value);
        }

        let optional = [
            (ORGANIZATION_HEADER, &self.organization),
            (PROJECT_HEADER, &self.project),
        ];
        for (name, value) in optional {
            if let Some(value) = value
                && let Ok(value) = HeaderValue::from_str(value)
            {
                headers.insert(HeaderName::from_static(name), value);
            }
        }
        headers
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }

    async fn post(&self, params: &ResponseCreateParams) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(self.responses_url())
            .headers(self.headers())
            .json(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

/// The `User-Agent` sent with every request.
#[must_use]
pub fn user_agent() -> String {
    format!("Agents/Rust {}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`Error::ProviderRequest`] from a non-2xx reply.
///
/// The message is the provider's `error.message` when the body carries
/// one, otherwise the raw body.
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or(body);
    Error::provider_request(Some(status), message, request_id)
}

/// Decode one SSE payload. An `error` event becomes an `Err`.
fn decode_event(data: &str) -> Result<ResponseStreamEvent> {
    let event: ResponseStreamEvent = serde_json::from_str(data)
        .map_err(|e| Error::provider_stream(format!("invalid stream event: {e}")))?;
    match event {
        ResponseStreamEvent::Error { code, message } => Err(Error::provider_stream(match code {
            Some(code) => format!("{message} (code: {code})"),
            None => message,
        })),
        event => Ok(event),
    }
}

#[async_trait]
impl ResponsesClient for OpenAIClient {
    #[instrument(skip_all, fields(model = %params.model))]
    async fn create(&self, params: &ResponseCreateParams) -> Result<Response> {
        debug!("Sending request to Responses API");
        let response = self.post(params).await?;
        let response: Response = response.json().await?;
        debug!(response_id = %response.id, "Responses API replied");
        Ok(response)
    }

    #[instrument(skip_all, fields(model = %params.model))]
    async fn create_stream(&self, params: &ResponseCreateParams) -> Result<ResponseStream> {
        debug!("Sending streaming request to Responses API");
        let response = self.post(params).await?;
        let events = SseStreamParser::new(Box::pin(response.bytes_stream()))
            .map(|data| data.and_then(|data| decode_event(&data)));
        Ok(Box::pin(events))
    }
}

/// Builder for [`OpenAIClient`].
#[derive(Debug, Default)]
pub struct OpenAIClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    organization: Option<String>,
    project: Option<String>,
    timeout_secs: Option<u64>,
}

impl OpenAIClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL.
    ///
    /// Useful for Azure `OpenAI`, local models, or proxies.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the organization id sent as `OpenAI-Organization`.
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the project id sent as `OpenAI-Project`.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the request timeout in seconds.
    ///
    /// Default is no timeout.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is not set or the
    /// HTTP client fails to build.
    pub fn build(self) -> Result<OpenAIClient> {
        let api_key = self
            .api_key
            .ok_or_else(|| Error::configuration("API key is required"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_API_BASE_URL.to_owned());

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(OpenAIClient {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            organization: self.organization.map(Into::into),
            project: self.project.map(Into::into),
        })
    }
}
