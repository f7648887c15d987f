//! Request/response DTOs for the chat endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::approval::PendingApproval;
use crate::domain::conversation::Turn;

/// Inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,
    /// Session to continue; a new session is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Authenticated store customer id, when logged in.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Reply for a completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub needs_approval: bool,
}

/// Persisted history for a session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

/// Approval resolution request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalDecision {
    pub approved: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Approval record view.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalView {
    pub session_id: String,
    #[serde(flatten)]
    pub approval: PendingApproval,
}
