//! Flow router.
//!
//! Decides, per inbound message, which execution path owns the turn. The
//! decision is a priority list, not a grammar: an active flow fully
//! pre-empts the other flow's triggers and the general path, and the
//! PC-builder trigger is checked before the checkout trigger.
//!
//! `route` is pure: flow entry is reported as an explicit target and the
//! caller performs the metadata transition.

use crate::domain::checkout::CheckoutStep;
use crate::domain::conversation::input;
use crate::domain::conversation::SessionMetadata;
use crate::domain::pc_builder::PcBuilderStep;

/// Where a turn is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Continue the active PC-builder flow at its persisted step.
    PcBuilder(PcBuilderStep),
    /// Continue the active checkout flow at its persisted step.
    Checkout(CheckoutStep),
    /// Trigger phrase detected: enter the PC-builder flow.
    EnterPcBuilder,
    /// Trigger phrase detected: enter the checkout flow.
    EnterCheckout,
    /// Free-form reasoning path.
    General,
}

/// Routes an inbound message. First match wins:
/// 1. active PC-builder flow
/// 2. active checkout flow
/// 3. PC-builder trigger phrase
/// 4. checkout trigger phrase
/// 5. general reasoning
pub fn route(metadata: &SessionMetadata, user_input: &str) -> RouteTarget {
    if metadata.pc_builder.is_active() {
        return RouteTarget::PcBuilder(metadata.pc_builder.step);
    }

    if metadata.checkout.is_active() {
        return RouteTarget::Checkout(metadata.checkout.step);
    }

    if input::matches_pc_builder_trigger(user_input) {
        return RouteTarget::EnterPcBuilder;
    }

    if input::matches_checkout_trigger(user_input) {
        return RouteTarget::EnterCheckout;
    }

    RouteTarget::General
}
