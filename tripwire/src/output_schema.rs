//! Declared shape of an agent's final output.

use schemars::JsonSchema;
use serde_json::Value;

use crate::error::Result;

/// The output type an agent is asked to produce.
///
/// A plain-text schema asks for free text; any other schema asks the
/// provider for structured JSON matching [`json_schema`](Self::json_schema).
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutputSchema {
    output_type_name: String,
    schema: Option<Value>,
    /// Whether the provider should enforce the schema strictly.
    pub strict_json_schema: bool,
}

impl AgentOutputSchema {
    /// Free-text output.
    #[must_use]
    pub fn plain_text() -> Self {
        Self {
            output_type_name: "str".to_owned(),
            schema: None,
            strict_json_schema: false,
        }
    }

    /// Structured output described by an explicit JSON schema.
    #[must_use]
    pub fn from_json_schema(name: impl Into<String>, schema: Value, strict: bool) -> Self {
        Self {
            output_type_name: name.into(),
            schema: Some(schema),
            strict_json_schema: strict,
        }
    }

    /// Structured output described by a Rust type's `JsonSchema` impl.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error) if the generated schema cannot
    /// be converted to a JSON value.
    pub fn for_type<T: JsonSchema>(strict: bool) -> Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(T))?;
        Ok(Self::from_json_schema(T::schema_name(), schema, strict))
    }

    /// Returns `true` if the output is free text.
    #[must_use]
    pub const fn is_plain_text(&self) -> bool {
        self.schema.is_none()
    }

    /// The JSON schema of the output, `None` for plain text.
    #[must_use]
    pub const fn json_schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    /// Name of the output type.
    #[must_use]
    pub fn output_type_name(&self) -> &str {
        &self.output_type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Verdict {
        is_math_homework: bool,
        reasoning: String,
    }

    #[test]
    fn test_plain_text() {
        let schema = AgentOutputSchema::plain_text();
        assert!(schema.is_plain_text());
        assert!(schema.json_schema().is_none());
    }

    #[test]
    fn test_from_json_schema() {
        let schema = AgentOutputSchema::from_json_schema(
            "Answer",
            json!({"type": "object", "properties": {"n": {"type": "integer"}}}),
            true,
        );
        assert!(!schema.is_plain_text());
        assert!(schema.strict_json_schema);
        assert_eq!(schema.output_type_name(), "Answer");
        assert_eq!(schema.json_schema().unwrap()["type"], "object");
    }

    #[test]
    fn test_for_type() {
        let schema = AgentOutputSchema::for_type::<Verdict>(true).unwrap();
        assert_eq!(schema.output_type_name(), "Verdict");
        let json = schema.json_schema().unwrap();
        assert!(json["properties"]["is_math_homework"].is_object());
        assert!(json["properties"]["reasoning"].is_object());
    }
}
