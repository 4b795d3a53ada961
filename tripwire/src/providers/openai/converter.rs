//! Translation from agent-level tools, handoffs and output schemas to
//! Responses API wire shapes.
//!
//! Everything here is pure: no I/O and no state shared between calls.

use crate::error::{Error, Result};
use crate::handoff::Handoff;
use crate::omit::Omittable;
use crate::output_schema::AgentOutputSchema;
use crate::tool::Tool;

use super::types::{
    HostedToolType, IncludeDirective, ResponseTextConfig, TextFormat, ToolChoiceParam, ToolParam,
};

/// Name of the structured output format sent to the provider.
pub const FINAL_OUTPUT_FORMAT_NAME: &str = "final_output";

/// Wire tools and the include directives they need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedTools {
    /// Tools in request order: agent tools first, then handoffs.
    pub tools: Vec<ToolParam>,
    /// Include directives, in tool order.
    pub includes: Vec<IncludeDirective>,
}

/// Converter between agent definitions and Responses API shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    /// Encode a `tool_choice` setting.
    ///
    /// `None` leaves the choice to the provider. `"auto"`, `"required"` and
    /// `"none"` pass through; hosted tool names select that tool; anything
    /// else names a function.
    #[must_use]
    pub fn convert_tool_choice(tool_choice: Option<&str>) -> Omittable<ToolChoiceParam> {
        let Some(choice) = tool_choice else {
            return Omittable::Unset;
        };
        let param = match choice {
            "auto" => ToolChoiceParam::Auto,
            "required" => ToolChoiceParam::Required,
            "none" => ToolChoiceParam::None,
            "file_search" => ToolChoiceParam::Hosted(HostedToolType::FileSearch),
            "web_search_preview" => ToolChoiceParam::Hosted(HostedToolType::WebSearchPreview),
            "computer_use_preview" => ToolChoiceParam::Hosted(HostedToolType::ComputerUsePreview),
            name => ToolChoiceParam::Function(name.to_owned()),
        };
        Omittable::Explicit(param)
    }

    /// Encode the response format for an output schema.
    ///
    /// Plain text (or no schema) leaves the format to the provider.
    #[must_use]
    pub fn get_response_format(
        output_schema: Option<&AgentOutputSchema>,
    ) -> Omittable<ResponseTextConfig> {
        let Some(schema) = output_schema else {
            return Omittable::Unset;
        };
        let Some(json_schema) = schema.json_schema() else {
            return Omittable::Unset;
        };
        Omittable::Explicit(ResponseTextConfig {
            format: TextFormat::JsonSchema {
                name: FINAL_OUTPUT_FORMAT_NAME.to_owned(),
                schema: json_schema.clone(),
                strict: schema.strict_json_schema,
            },
        })
    }

    /// Convert tools and handoffs to wire tools.
    ///
    /// # Errors
    ///
    /// - [`Error::MultipleComputerTools`] if more than one computer tool is
    ///   present.
    /// - [`Error::UnknownTool`] for a tool with no wire shape.
    pub fn convert_tools(tools: &[Tool], handoffs: &[Handoff]) -> Result<ConvertedTools> {
        let computer_tools = tools.iter().filter(|t| t.is_computer()).count();
        if computer_tools > 1 {
            return Err(Error::MultipleComputerTools {
                count: computer_tools,
            });
        }

        let mut converted = ConvertedTools {
            tools: Vec::with_capacity(tools.len() + handoffs.len()),
            includes: Vec::new(),
        };
        for tool in tools {
            let (param, include) = Self::convert_tool(tool)?;
            converted.tools.push(param);
            converted.includes.extend(include);
        }
        converted
            .tools
            .extend(handoffs.iter().map(Self::convert_handoff_tool));
        Ok(converted)
    }

    fn convert_tool(tool: &Tool) -> Result<(ToolParam, Option<IncludeDirective>)> {
        let converted = match tool {
            Tool::Function(f) => (
                ToolParam::Function {
                    name: f.name.clone(),
                    parameters: f.params_json_schema.clone(),
                    strict: f.strict_json_schema,
                    description: f.description.clone(),
                },
                None,
            ),
            Tool::WebSearch(ws) => (
                ToolParam::WebSearchPreview {
                    user_location: ws.user_location.clone(),
                    search_context_size: ws.search_context_size,
                },
                None,
            ),
            Tool::FileSearch(fs) => (
                ToolParam::FileSearch {
                    vector_store_ids: fs.vector_store_ids.clone(),
                    max_num_results: fs.max_num_results.filter(|n| *n > 0),
                    ranking_options: fs.ranking_options.clone(),
                    filters: fs.filters.clone().filter(|f| !is_empty_json(f)),
                },
                fs.include_search_results
                    .then_some(IncludeDirective::FileSearchCallResults),
            ),
            Tool::Computer(c) => (
                ToolParam::ComputerUsePreview {
                    environment: c.environment,
                    display_width: c.dimensions.0,
                    display_height: c.dimensions.1,
                },
                None,
            ),
            Tool::Other { .. } => return Err(Error::unknown_tool(tool.type_name())),
        };
        Ok(converted)
    }

    fn convert_handoff_tool(handoff: &Handoff) -> ToolParam {
        ToolParam::Function {
            name: handoff.tool_name.clone(),
            parameters: handoff.input_json_schema.clone(),
            strict: handoff.strict_json_schema,
            description: handoff.tool_description.clone(),
        }
    }
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
