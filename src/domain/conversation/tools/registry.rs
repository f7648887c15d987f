//! Tool Registry - the fixed catalog bound to the reasoning engine.

use super::ToolDefinition;

/// Catalog of all tools the reasoning engine may invoke.
///
/// Built once at startup from [`super::default_catalog`]; the registry is
/// constructed with its definitions rather than mutated at runtime.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Creates a registry from a list of definitions.
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    /// Gets a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Checks if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns all registered tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Returns the number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Converts the whole catalog to OpenAI function format.
    pub fn to_openai_tools(&self) -> Vec<serde_json::Value> {
        self.tools.iter().map(|t| t.to_openai_format()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> ToolRegistry {
        ToolRegistry::new(vec![
            ToolDefinition::no_args("tool_a", "A"),
            ToolDefinition::no_args("tool_b", "B"),
        ])
    }

    #[test]
    fn get_finds_registered_tools() {
        let registry = sample_registry();
        assert!(registry.has_tool("tool_a"));
        assert!(!registry.has_tool("tool_c"));
        assert_eq!(registry.get("tool_b").unwrap().description(), "B");
    }

    #[test]
    fn tool_names_lists_all() {
        let registry = sample_registry();
        assert_eq!(registry.tool_names(), vec!["tool_a", "tool_b"]);
        assert_eq!(registry.tool_count(), 2);
    }

    #[test]
    fn to_openai_tools_formats_every_tool() {
        let openai = sample_registry().to_openai_tools();
        assert_eq!(openai.len(), 2);
        assert_eq!(openai[0]["type"], "function");
        assert_eq!(openai[1]["function"]["name"], "tool_b");
    }
}
