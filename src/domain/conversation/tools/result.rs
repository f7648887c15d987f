//! Tool execution results.
//!
//! User precondition problems (not logged in, invalid arguments, unknown
//! entities) are values here, never errors: the reasoning engine receives
//! them as structured content and relays the user-facing message.

use serde_json::json;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// The operation succeeded; payload is tool-specific JSON.
    Success(serde_json::Value),
    /// The operation needs an authenticated user and none is present.
    /// The message is relayed to the user verbatim.
    LoginRequired { message: String },
    /// The operation failed in a way the user can act on.
    Failed { message: String },
}

impl ToolResult {
    pub fn success(payload: serde_json::Value) -> Self {
        ToolResult::Success(payload)
    }

    pub fn login_required(message: impl Into<String>) -> Self {
        ToolResult::LoginRequired {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ToolResult::Failed {
            message: message.into(),
        }
    }

    /// Renders the result as the content string fed back to the model.
    pub fn to_content(&self) -> String {
        match self {
            ToolResult::Success(payload) => payload.to_string(),
            ToolResult::LoginRequired { message } => json!({
                "error": "login_required",
                "message": message,
            })
            .to_string(),
            ToolResult::Failed { message } => json!({
                "success": false,
                "message": message,
            })
            .to_string(),
        }
    }

    /// Returns the success payload, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ToolResult::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// The human-readable message inside a success payload, if the tool
    /// provided one.
    pub fn display_message(&self) -> Option<&str> {
        self.payload()
            .and_then(|p| p.get("message"))
            .and_then(|m| m.as_str())
    }

    /// Reads the sensitive-action marker some tools attach. Returns the
    /// approval type when the payload carries `needs_approval: true`.
    pub fn approval_marker(&self) -> Option<&str> {
        let payload = self.payload()?;
        if payload.get("needs_approval").and_then(|v| v.as_bool()) == Some(true) {
            Some(
                payload
                    .get("approval_type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("general"),
            )
        } else {
            None
        }
    }
}
