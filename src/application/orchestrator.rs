//! Session Orchestrator - the per-turn pipeline.
//!
//! One inbound message runs load → route → execute → gate → persist to
//! completion before the session's next message is processed. The
//! conversation document is read once at turn start and replaced
//! wholesale at turn end; no field-level merging.
//!
//! Nothing propagates to the caller: every failure path still produces a
//! normal assistant turn and is persisted like any other turn.

use std::sync::Arc;

use crate::domain::approval::{ApprovalGate, PendingApproval};
use crate::domain::checkout::{CheckoutFlow, CheckoutState, CheckoutStep};
use crate::domain::conversation::{
    route, truncate_for_save, RouteTarget, Turn, MAX_PERSISTED_TURNS, RELOAD_WINDOW,
};
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::pc_builder::{PcBuilderFlow, PcBuilderState, PcBuilderStep};
use crate::ports::{ConversationStore, StoreError};

use super::ReasoningEngine;

/// Result of one orchestrated turn.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub session_id: SessionId,
    pub reply: String,
    pub needs_approval: bool,
}

/// Sequences one turn end-to-end and owns the session admin surface.
pub struct SessionOrchestrator {
    store: Arc<dyn ConversationStore>,
    reasoning: ReasoningEngine,
    checkout: CheckoutFlow,
    pc_builder: PcBuilderFlow,
    gate: Arc<ApprovalGate>,
}

impl SessionOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        reasoning: ReasoningEngine,
        checkout: CheckoutFlow,
        pc_builder: PcBuilderFlow,
        gate: Arc<ApprovalGate>,
    ) -> Self {
        Self {
            store,
            reasoning,
            checkout,
            pc_builder,
            gate,
        }
    }

    /// Handles one inbound message for a session.
    pub async fn handle_message(
        &self,
        session: &SessionId,
        user: Option<UserId>,
        user_input: &str,
    ) -> TurnReply {
        // Load. A store failure degrades to an empty session rather than
        // failing the turn.
        let record = match self.store.load(session, RELOAD_WINDOW).await {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, %session, "session load failed; starting empty");
                Default::default()
            }
        };

        let mut turns = record.turns;
        let mut metadata = record.metadata;
        metadata.repair();

        // A user id supplied with the request wins over the stored one.
        if let Some(user) = user.filter(|u| !u.is_blank()) {
            metadata.user_id = Some(user);
        }
        let user_id = metadata.user_id.clone();

        turns.push(Turn::user(user_input));

        // Route and execute.
        let target = route(&metadata, user_input);
        tracing::debug!(?target, %session, "turn routed");

        let (reply, tool_results) = match target {
            RouteTarget::EnterPcBuilder => {
                let outcome = self
                    .pc_builder
                    .handle(
                        PcBuilderStep::None,
                        PcBuilderState::enter(),
                        user_id.as_ref(),
                        session,
                        user_input,
                    )
                    .await;
                metadata.pc_builder = outcome.state;
                (outcome.reply, Vec::new())
            }
            RouteTarget::PcBuilder(step) => {
                let outcome = self
                    .pc_builder
                    .handle(
                        step,
                        metadata.pc_builder.clone(),
                        user_id.as_ref(),
                        session,
                        user_input,
                    )
                    .await;
                metadata.pc_builder = outcome.state;
                (outcome.reply, Vec::new())
            }
            RouteTarget::EnterCheckout => {
                let outcome = self
                    .checkout
                    .handle(
                        CheckoutStep::Shipping,
                        CheckoutState::enter(),
                        user_id.as_ref(),
                        user_input,
                    )
                    .await;
                metadata.checkout = outcome.state;
                (outcome.reply, Vec::new())
            }
            RouteTarget::Checkout(step) => {
                let outcome = self
                    .checkout
                    .handle(step, metadata.checkout.clone(), user_id.as_ref(), user_input)
                    .await;
                metadata.checkout = outcome.state;
                (outcome.reply, Vec::new())
            }
            RouteTarget::General => {
                let outcome = self
                    .reasoning
                    .respond(session, user_id.as_ref(), &turns[..turns.len() - 1], user_input)
                    .await;
                (outcome.reply, outcome.tool_results)
            }
        };

        // Gate: advisory bookkeeping, the reply passes through unchanged.
        let needs_approval = self.gate.inspect(session, &tool_results, &reply);

        // Persist. A save failure is logged; the reply still goes out.
        turns.push(Turn::assistant(&reply));
        truncate_for_save(&mut turns);
        metadata.set_reply_preview(&reply);

        if let Err(e) = self.store.save(session, &turns, &metadata).await {
            tracing::error!(error = %e, %session, "session save failed");
        }

        TurnReply {
            session_id: session.clone(),
            reply,
            needs_approval,
        }
    }

    /// Returns the persisted history for a session (up to the retention
    /// cap).
    pub async fn history(&self, session: &SessionId) -> Result<Vec<Turn>, StoreError> {
        Ok(self
            .store
            .load(session, MAX_PERSISTED_TURNS)
            .await?
            .map(|r| r.turns)
            .unwrap_or_default())
    }

    /// Deletes a session document.
    pub async fn clear_session(&self, session: &SessionId) -> Result<(), StoreError> {
        self.store.delete(session).await
    }

    /// Lists known sessions.
    pub async fn sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        self.store.list_sessions().await
    }

    /// Returns the pending approval for a session, if any.
    pub fn pending_approval(&self, session: &SessionId) -> Option<PendingApproval> {
        self.gate.pending_for(session)
    }

    /// Resolves a session's pending approval.
    pub fn resolve_approval(
        &self,
        session: &SessionId,
        approved: bool,
        feedback: Option<String>,
    ) -> Option<PendingApproval> {
        self.gate.resolve(session, approved, feedback)
    }
}
