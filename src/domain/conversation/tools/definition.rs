//! Tool definition - schema and metadata for a tool.

use serde::{Deserialize, Serialize};

/// Definition of a tool the reasoning engine may invoke.
///
/// Carries the JSON Schema used for provider tool binding and for
/// validating model-supplied arguments before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "search_products").
    name: String,

    /// Human-readable description for the model and docs.
    description: String,

    /// JSON Schema for the parameters.
    parameters_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Creates a definition for a tool that takes no arguments.
    pub fn no_args(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            serde_json::json!({"type": "object", "properties": {}}),
        )
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema.
    pub fn parameters_schema(&self) -> &serde_json::Value {
        &self.parameters_schema
    }

    /// Converts to OpenAI tool format.
    pub fn to_openai_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_definition() {
        let def = ToolDefinition::new(
            "search_products",
            "Search products by name or description",
            serde_json::json!({
                "type": "object",
                "required": ["query"],
                "properties": {"query": {"type": "string"}}
            }),
        );

        assert_eq!(def.name(), "search_products");
        assert!(def.parameters_schema()["required"].is_array());
    }

    #[test]
    fn no_args_has_empty_properties() {
        let def = ToolDefinition::no_args("get_price_range", "Get catalog price range");
        assert_eq!(def.parameters_schema()["type"], "object");
        assert!(def.parameters_schema()["properties"]
            .as_object()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn to_openai_format_has_correct_structure() {
        let def = ToolDefinition::no_args("get_price_range", "Get catalog price range");
        let openai = def.to_openai_format();

        assert_eq!(openai["type"], "function");
        assert_eq!(openai["function"]["name"], "get_price_range");
        assert!(openai["function"]["parameters"].is_object());
    }
}
