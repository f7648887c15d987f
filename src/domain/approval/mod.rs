//! Human-approval gate.
//!
//! After a turn produces its response, the gate scans executed tool
//! results for an explicit `needs_approval` marker and, failing that, the
//! final answer for sensitive-action keywords. Matches register a pending
//! approval record for an external approver. The gate is advisory: the
//! turn's reply is returned to the user unchanged, and nothing waits on
//! resolution.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::conversation::tools::ToolResult;
use crate::domain::foundation::{SessionId, Timestamp};

/// Keywords in a final answer that flag a sensitive action when no tool
/// marker was present.
const SENSITIVE_KEYWORDS: [&str; 5] = [
    "delete",
    "remove all",
    "empty cart",
    "place order",
    "confirm order",
];

/// Resolution state of a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// A registered approval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Action type ("final_order_confirmation", "ai_response", ...).
    pub action: String,
    /// Context snapshot for the approver.
    pub context: serde_json::Value,
    pub requested_at: Timestamp,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<Timestamp>,
}

/// In-process approval registry, keyed by session.
#[derive(Debug, Default)]
pub struct ApprovalGate {
    pending: Mutex<HashMap<SessionId, PendingApproval>>,
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspects a finished turn. Registers an approval record and returns
    /// true when the turn contains a sensitive action.
    pub fn inspect(
        &self,
        session: &SessionId,
        tool_results: &[ToolResult],
        reply: &str,
    ) -> bool {
        // Explicit marker from a tool wins.
        for result in tool_results {
            if let Some(approval_type) = result.approval_marker() {
                self.register(
                    session,
                    approval_type,
                    serde_json::json!({
                        "response": result.to_content(),
                        "approval_type": approval_type,
                    }),
                );
                return true;
            }
        }

        // Fallback: keyword scan of the final answer.
        let lowered = reply.to_lowercase();
        if SENSITIVE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            self.register(
                session,
                "ai_response",
                serde_json::json!({ "response": reply }),
            );
            return true;
        }

        false
    }

    /// Registers a pending approval, replacing any previous one for the
    /// session.
    pub fn register(&self, session: &SessionId, action: &str, context: serde_json::Value) {
        tracing::debug!(%session, action, "approval requested");
        let mut pending = self.pending.lock().unwrap();
        pending.insert(
            session.clone(),
            PendingApproval {
                action: action.to_string(),
                context,
                requested_at: Timestamp::now(),
                status: ApprovalStatus::Pending,
                feedback: None,
                resolved_at: None,
            },
        );
    }

    /// Resolves a session's pending approval. Returns the updated record,
    /// or `None` if nothing was pending.
    pub fn resolve(
        &self,
        session: &SessionId,
        approved: bool,
        feedback: Option<String>,
    ) -> Option<PendingApproval> {
        let mut pending = self.pending.lock().unwrap();
        let record = pending.get_mut(session)?;
        record.status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };
        record.feedback = feedback;
        record.resolved_at = Some(Timestamp::now());
        Some(record.clone())
    }

    /// Returns the pending approval for one session, if any.
    pub fn pending_for(&self, session: &SessionId) -> Option<PendingApproval> {
        self.pending
            .lock()
            .unwrap()
            .get(session)
            .filter(|r| r.status == ApprovalStatus::Pending)
            .cloned()
    }

    /// Lists all still-pending approvals.
    pub fn all_pending(&self) -> Vec<(SessionId, PendingApproval)> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.status == ApprovalStatus::Pending)
            .map(|(s, r)| (s.clone(), r.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> SessionId {
        SessionId::new("s-1")
    }

    #[test]
    fn tool_marker_registers_typed_approval() {
        let gate = ApprovalGate::new();
        let results = vec![ToolResult::success(json!({
            "needs_approval": true,
            "approval_type": "final_order_confirmation",
        }))];

        assert!(gate.inspect(&session(), &results, "Order placed"));
        let pending = gate.pending_for(&session()).unwrap();
        assert_eq!(pending.action, "final_order_confirmation");
        assert_eq!(pending.status, ApprovalStatus::Pending);
    }

    #[test]
    fn keyword_fallback_registers_ai_response_approval() {
        let gate = ApprovalGate::new();
        assert!(gate.inspect(&session(), &[], "I will empty cart now"));
        assert_eq!(gate.pending_for(&session()).unwrap().action, "ai_response");
    }

    #[test]
    fn benign_reply_registers_nothing() {
        let gate = ApprovalGate::new();
        assert!(!gate.inspect(&session(), &[], "Here are some laptops you might like"));
        assert!(gate.pending_for(&session()).is_none());
    }

    #[test]
    fn tool_marker_wins_over_keywords() {
        let gate = ApprovalGate::new();
        let results = vec![ToolResult::success(json!({
            "needs_approval": true,
            "approval_type": "order_cancellation",
        }))];
        // Reply also contains a keyword, but the marker's type is kept.
        assert!(gate.inspect(&session(), &results, "place order done"));
        assert_eq!(
            gate.pending_for(&session()).unwrap().action,
            "order_cancellation"
        );
    }

    #[test]
    fn resolve_updates_status_and_feedback() {
        let gate = ApprovalGate::new();
        gate.register(&session(), "ai_response", json!({}));

        let resolved = gate
            .resolve(&session(), false, Some("looks wrong".to_string()))
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Rejected);
        assert_eq!(resolved.feedback.as_deref(), Some("looks wrong"));
        assert!(resolved.resolved_at.is_some());

        // No longer listed as pending.
        assert!(gate.pending_for(&session()).is_none());
        assert!(gate.all_pending().is_empty());
    }

    #[test]
    fn resolve_without_pending_returns_none() {
        let gate = ApprovalGate::new();
        assert!(gate.resolve(&session(), true, None).is_none());
    }

    #[test]
    fn all_pending_lists_multiple_sessions() {
        let gate = ApprovalGate::new();
        gate.register(&SessionId::new("a"), "ai_response", json!({}));
        gate.register(&SessionId::new("b"), "ai_response", json!({}));
        assert_eq!(gate.all_pending().len(), 2);
    }
}
