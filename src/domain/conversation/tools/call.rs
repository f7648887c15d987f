//! A tool invocation requested by the reasoning engine.

use serde::{Deserialize, Serialize};

/// One requested invocation: tool name plus model-supplied arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned invocation id, echoed back with the result.
    pub id: String,
    /// Tool name from the registry.
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Reads a string argument.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(|v| v.as_str())
    }

    /// Reads a non-empty, trimmed string argument.
    pub fn required_str(&self, name: &str) -> Option<&str> {
        self.str_arg(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Reads an unsigned integer argument.
    pub fn u32_arg(&self, name: &str) -> Option<u32> {
        self.arguments
            .get(name)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Reads a signed integer argument.
    pub fn i64_arg(&self, name: &str) -> Option<i64> {
        self.arguments.get(name).and_then(|v| v.as_i64())
    }

    /// Reads a float argument.
    pub fn f64_arg(&self, name: &str) -> Option<f64> {
        self.arguments.get(name).and_then(|v| v.as_f64())
    }
}
