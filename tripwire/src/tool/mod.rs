//! Tool descriptors an agent may expose to the model.
//!
//! [`Tool`] is a closed set of variants. Each has exactly one wire shape in
//! the Responses API converter (see
//! [`Converter::convert_tools`](crate::providers::openai::Converter::convert_tools)).
//! Invoking a function tool is the run loop's job; this crate only
//! describes tools.
//!
//! Tools also deserialize from JSON declarations tagged by `type`:
//!
//! ```json
//! {"type": "function", "name": "get_weather", "description": "...", "parameters": {...}}
//! {"type": "file_search", "vector_store_ids": ["vs_1"], "max_num_results": 3}
//! ```
//!
//! A declaration with an unrecognised `type` becomes [`Tool::Other`], which
//! the converter rejects with [`Error::UnknownTool`](crate::Error).

mod server;

pub use server::{ToolDescriptor, ToolServer, tools_from_server};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A function the model can call by name with JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    /// Name the model uses to call the tool.
    pub name: String,
    /// What the tool does, shown to the model.
    #[serde(default)]
    pub description: String,
    /// JSON schema of the arguments.
    #[serde(alias = "parameters")]
    pub params_json_schema: Value,
    /// Whether the provider should enforce the schema strictly.
    #[serde(alias = "strict", default = "default_strict")]
    pub strict_json_schema: bool,
}

const fn default_strict() -> bool {
    true
}

impl FunctionTool {
    /// Create a strict function tool.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params_json_schema: schema,
            strict_json_schema: true,
        }
    }

    /// Set whether the schema is enforced strictly.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict_json_schema = strict;
        self
    }
}

/// How much context a hosted web search retrieves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    /// Least context, fastest.
    Low,
    /// The provider default.
    #[default]
    Medium,
    /// Most context, slowest.
    High,
}

/// Approximate user location for web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    /// Location kind; the API only accepts `"approximate"`.
    #[serde(rename = "type", default = "approximate")]
    pub kind: String,
    /// Free-text city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// ISO 3166-1 country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Free-text region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// IANA timezone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn approximate() -> String {
    "approximate".to_owned()
}

impl Default for UserLocation {
    fn default() -> Self {
        Self {
            kind: approximate(),
            city: None,
            country: None,
            region: None,
            timezone: None,
        }
    }
}

/// A hosted tool that searches the web.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchTool {
    /// Optional location hint.
    #[serde(default)]
    pub user_location: Option<UserLocation>,
    /// How much context to retrieve.
    #[serde(default)]
    pub search_context_size: SearchContextSize,
}

/// Ranking options for file search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Ranker to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranker: Option<String>,
    /// Minimum score for a result to be returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

/// A hosted tool that searches vector stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSearchTool {
    /// Vector stores to search.
    pub vector_store_ids: Vec<String>,
    /// Maximum number of results.
    #[serde(default)]
    pub max_num_results: Option<u32>,
    /// Whether search results are included in the response.
    #[serde(default)]
    pub include_search_results: bool,
    /// Ranking options.
    #[serde(default)]
    pub ranking_options: Option<RankingOptions>,
    /// Attribute filter, passed through verbatim.
    #[serde(default)]
    pub filters: Option<Value>,
}

impl FileSearchTool {
    /// Search the given vector stores.
    #[must_use]
    pub fn new(vector_store_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            vector_store_ids: vector_store_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the maximum number of results.
    #[must_use]
    pub const fn max_num_results(mut self, max: u32) -> Self {
        self.max_num_results = Some(max);
        self
    }

    /// Include search results in the response.
    #[must_use]
    pub const fn include_search_results(mut self, include: bool) -> Self {
        self.include_search_results = include;
        self
    }
}

/// The environment a computer-use tool drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// macOS desktop.
    Mac,
    /// Windows desktop.
    Windows,
    /// Ubuntu desktop.
    Ubuntu,
    /// A web browser.
    Browser,
}

/// A hosted tool that lets the model control a computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerTool {
    /// The environment being controlled.
    pub environment: Environment,
    /// Viewport `(width, height)` in pixels.
    pub dimensions: (u32, u32),
}

impl ComputerTool {
    /// Create a computer tool.
    #[must_use]
    pub const fn new(environment: Environment, width: u32, height: u32) -> Self {
        Self {
            environment,
            dimensions: (width, height),
        }
    }
}

/// A tool an agent exposes to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// A function call.
    Function(FunctionTool),
    /// Hosted web search.
    WebSearch(WebSearchTool),
    /// Hosted file search.
    FileSearch(FileSearchTool),
    /// Hosted computer control.
    Computer(ComputerTool),
    /// A declaration whose `type` this crate does not know.
    Other {
        /// The declared type.
        type_name: String,
        /// The full declaration.
        config: Value,
    },
}

impl Tool {
    /// The runtime type name of this tool, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Function(_) => "FunctionTool",
            Self::WebSearch(_) => "WebSearchTool",
            Self::FileSearch(_) => "FileSearchTool",
            Self::Computer(_) => "ComputerTool",
            Self::Other { type_name, .. } => type_name,
        }
    }

    /// The name the model sees for this tool.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Function(f) => &f.name,
            Self::WebSearch(_) => "web_search_preview",
            Self::FileSearch(_) => "file_search",
            Self::Computer(_) => "computer_use_preview",
            Self::Other { type_name, .. } => type_name,
        }
    }

    /// Returns `true` for computer-control tools.
    #[must_use]
    pub const fn is_computer(&self) -> bool {
        matches!(self, Self::Computer(_))
    }
}

impl From<FunctionTool> for Tool {
    fn from(tool: FunctionTool) -> Self {
        Self::Function(tool)
    }
}

impl From<WebSearchTool> for Tool {
    fn from(tool: WebSearchTool) -> Self {
        Self::WebSearch(tool)
    }
}

impl From<FileSearchTool> for Tool {
    fn from(tool: FileSearchTool) -> Self {
        Self::FileSearch(tool)
    }
}

impl From<ComputerTool> for Tool {
    fn from(tool: ComputerTool) -> Self {
        Self::Computer(tool)
    }
}

impl<'de> Deserialize<'de> for Tool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_owned();

        let tool = match kind.as_str() {
            "function" => Self::Function(serde_json::from_value(value).map_err(D::Error::custom)?),
            "web_search" | "web_search_preview" => {
                Self::WebSearch(serde_json::from_value(value).map_err(D::Error::custom)?)
            }
            "file_search" => {
                Self::FileSearch(serde_json::from_value(value).map_err(D::Error::custom)?)
            }
            "computer" | "computer_use_preview" => {
                Self::Computer(serde_json::from_value(value).map_err(D::Error::custom)?)
            }
            _ => Self::Other {
                type_name: kind,
                config: value,
            },
        };
        Ok(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_function_tool() {
        let tool: Tool = serde_json::from_value(json!({
            "type": "function",
            "name": "get_weather",
            "description": "Look up the weather",
            "parameters": {"type": "object", "properties": {}}
        }))
        .unwrap();

        let Tool::Function(f) = tool else {
            panic!("expected function tool");
        };
        assert_eq!(f.name, "get_weather");
        assert!(f.strict_json_schema);
        assert_eq!(f.params_json_schema["type"], "object");
    }

    #[test]
    fn test_deserialize_hosted_tools() {
        let tools: Vec<Tool> = serde_json::from_value(json!([
            {"type": "web_search", "search_context_size": "high"},
            {"type": "file_search", "vector_store_ids": ["vs_1"], "max_num_results": 3},
            {"type": "computer", "environment": "browser", "dimensions": [1024, 768]}
        ]))
        .unwrap();

        assert_eq!(
            tools[0],
            Tool::WebSearch(WebSearchTool {
                user_location: None,
                search_context_size: SearchContextSize::High,
            })
        );
        assert_eq!(
            tools[1],
            Tool::FileSearch(FileSearchTool::new(["vs_1"]).max_num_results(3))
        );
        assert_eq!(
            tools[2],
            Tool::Computer(ComputerTool::new(Environment::Browser, 1024, 768))
        );
    }

    #[test]
    fn test_deserialize_unknown_type() {
        let tool: Tool =
            serde_json::from_value(json!({"type": "code_interpreter", "container": "auto"}))
                .unwrap();
        assert_eq!(tool.type_name(), "code_interpreter");
        assert!(matches!(tool, Tool::Other { .. }));
    }

    #[test]
    fn test_deserialize_missing_type() {
        let result: Result<Tool, _> = serde_json::from_value(json!({"name": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_names() {
        let tool = Tool::from(FunctionTool::new("add", "Add numbers", json!({})));
        assert_eq!(tool.name(), "add");
        assert_eq!(tool.type_name(), "FunctionTool");
        assert!(Tool::from(ComputerTool::new(Environment::Mac, 1, 1)).is_computer());
    }
}
