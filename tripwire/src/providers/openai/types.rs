//! Wire types for the `OpenAI` Responses API.
//!
//! Request types serialize to exactly the JSON the API expects. Optional
//! request fields use [`Omittable`] so that "no preference" is omitted
//! instead of sent as `null`.

use std::collections::HashMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::model_settings::{Reasoning, Truncation};
use crate::omit::Omittable;
use crate::tool::{Environment, RankingOptions, SearchContextSize, UserLocation};

/// Extra data the API should include in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncludeDirective {
    /// Full file search results.
    #[serde(rename = "file_search_call.results")]
    FileSearchCallResults,
    /// Image URLs of input images.
    #[serde(rename = "message.input_image.image_url")]
    InputImageUrl,
    /// Image URLs of computer call screenshots.
    #[serde(rename = "computer_call_output.output.image_url")]
    ComputerCallOutputImageUrl,
}

/// A tool as sent to the Responses API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolParam {
    /// `{"type": "function", ...}`
    Function {
        /// Function name.
        name: String,
        /// JSON schema of the arguments.
        parameters: Value,
        /// Whether the schema is enforced strictly.
        strict: bool,
        /// Description shown to the model.
        description: String,
    },
    /// `{"type": "web_search_preview", ...}`
    WebSearchPreview {
        /// Location hint; `null` when unknown.
        user_location: Option<UserLocation>,
        /// Amount of context to retrieve.
        search_context_size: SearchContextSize,
    },
    /// `{"type": "file_search", ...}`
    FileSearch {
        /// Vector stores to search.
        vector_store_ids: Vec<String>,
        /// Maximum number of results.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_num_results: Option<u32>,
        /// Ranking options.
        #[serde(skip_serializing_if = "Option::is_none")]
        ranking_options: Option<RankingOptions>,
        /// Attribute filter.
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<Value>,
    },
    /// `{"type": "computer_use_preview", ...}`
    ComputerUsePreview {
        /// Controlled environment.
        environment: Environment,
        /// Viewport width in pixels.
        display_width: u32,
        /// Viewport height in pixels.
        display_height: u32,
    },
}

/// A built-in tool that `tool_choice` can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostedToolType {
    /// `file_search`
    FileSearch,
    /// `web_search_preview`
    WebSearchPreview,
    /// `computer_use_preview`
    ComputerUsePreview,
}

impl HostedToolType {
    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileSearch => "file_search",
            Self::WebSearchPreview => "web_search_preview",
            Self::ComputerUsePreview => "computer_use_preview",
        }
    }
}

/// The `tool_choice` request field.
///
/// Modes serialize as bare strings; hosted tools as `{"type": ...}`; a
/// function as `{"type": "function", "name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolChoiceParam {
    /// `"auto"`
    Auto,
    /// `"required"`
    Required,
    /// `"none"`
    None,
    /// A built-in tool.
    Hosted(HostedToolType),
    /// A function tool or handoff by name.
    Function(String),
}

impl Serialize for ToolChoiceParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::Required => serializer.serialize_str("required"),
            Self::None => serializer.serialize_str("none"),
            Self::Hosted(tool) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", tool.as_str())?;
                map.end()
            }
            Self::Function(name) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "function")?;
                map.serialize_entry("name", name)?;
                map.end()
            }
        }
    }
}

/// Output format of a structured response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextFormat {
    /// JSON matching a schema.
    JsonSchema {
        /// Schema name.
        name: String,
        /// The JSON schema.
        schema: Value,
        /// Whether the schema is enforced strictly.
        strict: bool,
    },
}

/// The `text` request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTextConfig {
    /// The output format.
    pub format: TextFormat,
}

/// Body of `POST /responses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseCreateParams {
    /// System instructions.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub instructions: Omittable<String>,
    /// Model name.
    pub model: String,
    /// Input items.
    pub input: Vec<Value>,
    /// Include directives.
    pub include: Vec<IncludeDirective>,
    /// Tools.
    pub tools: Vec<ToolParam>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub temperature: Omittable<f32>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub top_p: Omittable<f32>,
    /// Truncation strategy.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub truncation: Omittable<Truncation>,
    /// Maximum output tokens.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub max_output_tokens: Omittable<u32>,
    /// Tool choice.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub tool_choice: Omittable<ToolChoiceParam>,
    /// Whether several tool calls may be emitted per turn.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub parallel_tool_calls: Omittable<bool>,
    /// Whether the response is streamed.
    pub stream: bool,
    /// Response format.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub text: Omittable<ResponseTextConfig>,
    /// Whether the provider stores the response.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub store: Omittable<bool>,
    /// Reasoning configuration.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub reasoning: Omittable<Reasoning>,
    /// Metadata attached to the response.
    #[serde(skip_serializing_if = "Omittable::is_unset")]
    pub metadata: Omittable<HashMap<String, String>>,
}

impl ResponseCreateParams {
    /// A non-streaming request with every optional field left unset.
    #[must_use]
    pub fn new(model: impl Into<String>, input: Vec<Value>) -> Self {
        Self {
            instructions: Omittable::Unset,
            model: model.into(),
            input,
            include: Vec::new(),
            tools: Vec::new(),
            temperature: Omittable::Unset,
            top_p: Omittable::Unset,
            truncation: Omittable::Unset,
            max_output_tokens: Omittable::Unset,
            tool_choice: Omittable::Unset,
            parallel_tool_calls: Omittable::Unset,
            stream: false,
            text: Omittable::Unset,
            store: Omittable::Unset,
            reasoning: Omittable::Unset,
            metadata: Omittable::Unset,
        }
    }
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseUsage {
    /// Input tokens.
    pub input_tokens: u64,
    /// Output tokens.
    pub output_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}

/// A response object.
///
/// Output items are kept as raw JSON; interpreting them is the run loop's
/// job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response id, usable as `previous_response_id` later.
    pub id: String,
    /// Model that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// `completed`, `failed`, `in_progress` or `incomplete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Output items.
    #[serde(default)]
    pub output: Vec<Value>,
    /// Token accounting; absent on some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
    /// Error details for failed responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// One event of a streamed response.
///
/// Events this crate does not model are kept verbatim in
/// [`Other`](Self::Other) and forwarded like any other.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseStreamEvent {
    /// `response.created`
    Created {
        /// The response so far.
        response: Response,
    },
    /// `response.in_progress`
    InProgress {
        /// The response so far.
        response: Response,
    },
    /// `response.output_text.delta`
    OutputTextDelta {
        /// Output item the delta belongs to.
        item_id: String,
        /// Index of the output item.
        output_index: u32,
        /// Index of the content part.
        content_index: u32,
        /// Text delta.
        delta: String,
    },
    /// `response.output_item.done`
    OutputItemDone {
        /// Index of the output item.
        output_index: u32,
        /// The finished item.
        item: Value,
    },
    /// `response.completed`
    Completed {
        /// The final aggregate response.
        response: Response,
    },
    /// `response.failed`
    Failed {
        /// The failed response.
        response: Response,
    },
    /// `error`
    Error {
        /// Error code.
        code: Option<String>,
        /// Error message.
        message: String,
    },
    /// Any other event.
    Other {
        /// The event's `type`.
        event_type: String,
        /// The full event.
        data: Value,
    },
}

impl ResponseStreamEvent {
    /// The event's `type` string.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Created { .. } => "response.created",
            Self::InProgress { .. } => "response.in_progress",
            Self::OutputTextDelta { .. } => "response.output_text.delta",
            Self::OutputItemDone { .. } => "response.output_item.done",
            Self::Completed { .. } => "response.completed",
            Self::Failed { .. } => "response.failed",
            Self::Error { .. } => "error",
            Self::Other { event_type, .. } => event_type,
        }
    }

    /// The final response, if this is the completion event.
    #[must_use]
    pub const fn completed_response(&self) -> Option<&Response> {
        match self {
            Self::Completed { response } => Some(response),
            _ => None,
        }
    }
}

fn field<T: DeserializeOwned>(value: &Value, name: &'static str) -> serde_json::Result<T> {
    let raw = value
        .get(name)
        .ok_or_else(|| serde_json::Error::missing_field(name))?;
    T::deserialize(raw)
}

fn optional_field<T: DeserializeOwned>(
    value: &Value,
    name: &'static str,
) -> serde_json::Result<Option<T>> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => T::deserialize(raw).map(Some),
    }
}

fn parse_event(event_type: String, value: Value) -> serde_json::Result<ResponseStreamEvent> {
    let event = match event_type.as_str() {
        "response.created" => ResponseStreamEvent::Created {
            response: field(&value, "response")?,
        },
        "response.in_progress" => ResponseStreamEvent::InProgress {
            response: field(&value, "response")?,
        },
        "response.output_text.delta" => ResponseStreamEvent::OutputTextDelta {
            item_id: field(&value, "item_id")?,
            output_index: field(&value, "output_index")?,
            content_index: field(&value, "content_index")?,
            delta: field(&value, "delta")?,
        },
        "response.output_item.done" => ResponseStreamEvent::OutputItemDone {
            output_index: field(&value, "output_index")?,
            item: field(&value, "item")?,
        },
        "response.completed" => ResponseStreamEvent::Completed {
            response: field(&value, "response")?,
        },
        "response.failed" => ResponseStreamEvent::Failed {
            response: field(&value, "response")?,
        },
        "error" => ResponseStreamEvent::Error {
            code: optional_field(&value, "code")?,
            message: field(&value, "message")?,
        },
        _ => ResponseStreamEvent::Other {
            event_type,
            data: value,
        },
    };
    Ok(event)
}

impl<'de> Deserialize<'de> for ResponseStreamEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_owned();
        parse_event(event_type, value).map_err(D::Error::custom)
    }
}
