//! Per-session flow metadata, persisted alongside the turn log.
//!
//! Replaces the original dynamic metadata blob with discriminated structs
//! per flow. Deserialization defaults every missing or unknown field so a
//! document written by an older build loads safely.

use serde::{Deserialize, Serialize};

use crate::domain::checkout::CheckoutState;
use crate::domain::foundation::UserId;
use crate::domain::pc_builder::PcBuilderState;

/// Which deterministic flow currently owns the session, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFlow {
    Checkout,
    PcBuilder,
}

/// Flow metadata persisted per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Authenticated store customer, when known.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Checkout flow state.
    #[serde(default)]
    pub checkout: CheckoutState,
    /// PC-builder flow state.
    #[serde(default)]
    pub pc_builder: PcBuilderState,
    /// Preview of the last assistant reply (first 100 chars), kept for
    /// session listings.
    #[serde(default)]
    pub last_reply_preview: String,
}

impl SessionMetadata {
    /// Returns the flow that owns the session. PC builder wins when both
    /// are somehow marked active, matching router priority.
    pub fn active_flow(&self) -> Option<ActiveFlow> {
        if self.pc_builder.is_active() {
            Some(ActiveFlow::PcBuilder)
        } else if self.checkout.is_active() {
            Some(ActiveFlow::Checkout)
        } else {
            None
        }
    }

    /// Repairs an inconsistent document where both flows are marked
    /// active: the PC-builder flow is kept and the checkout flow reset.
    /// Run once per load, before routing.
    pub fn repair(&mut self) {
        if self.pc_builder.is_active() && self.checkout.is_active() {
            tracing::warn!("both flows active in persisted metadata; resetting checkout");
            self.checkout.reset();
        }
    }

    /// Records the reply preview stored with the document.
    pub fn set_reply_preview(&mut self, reply: &str) {
        self.last_reply_preview = reply.chars().take(100).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::CheckoutStep;
    use crate::domain::pc_builder::PcBuilderStep;
    use crate::domain::commerce::ComponentCategory;

    #[test]
    fn default_metadata_has_no_active_flow() {
        assert_eq!(SessionMetadata::default().active_flow(), None);
    }

    #[test]
    fn checkout_flow_is_reported_active() {
        let metadata = SessionMetadata {
            checkout: CheckoutState::enter(),
            ..Default::default()
        };
        assert_eq!(metadata.active_flow(), Some(ActiveFlow::Checkout));
    }

    #[test]
    fn pc_builder_wins_when_both_flows_active() {
        let metadata = SessionMetadata {
            checkout: CheckoutState::enter(),
            pc_builder: PcBuilderState::enter(),
            ..Default::default()
        };
        assert_eq!(metadata.active_flow(), Some(ActiveFlow::PcBuilder));
    }

    #[test]
    fn repair_resets_checkout_when_both_active() {
        let mut metadata = SessionMetadata {
            checkout: CheckoutState::enter(),
            pc_builder: PcBuilderState::enter(),
            ..Default::default()
        };
        metadata.repair();

        assert!(!metadata.checkout.is_active());
        assert_eq!(metadata.checkout.step, CheckoutStep::None);
        assert_eq!(
            metadata.pc_builder.step,
            PcBuilderStep::Category(ComponentCategory::Ram)
        );
    }

    #[test]
    fn repair_leaves_consistent_documents_alone() {
        let mut metadata = SessionMetadata {
            checkout: CheckoutState::enter(),
            ..Default::default()
        };
        let before = metadata.clone();
        metadata.repair();
        assert_eq!(metadata, before);
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let mut metadata = SessionMetadata {
            user_id: Some(UserId::new("u-1")),
            pc_builder: PcBuilderState::enter(),
            ..Default::default()
        };
        metadata.set_reply_preview("Hello there, shopper");

        let json = serde_json::to_string(&metadata).unwrap();
        let back: SessionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let metadata: SessionMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata, SessionMetadata::default());
    }

    #[test]
    fn reply_preview_is_capped_at_100_chars() {
        let mut metadata = SessionMetadata::default();
        metadata.set_reply_preview(&"x".repeat(500));
        assert_eq!(metadata.last_reply_preview.chars().count(), 100);
    }
}
