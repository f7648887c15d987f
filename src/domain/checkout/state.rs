//! Checkout flow state, persisted per session between turns.

use serde::{Deserialize, Serialize};

use crate::domain::commerce::{CartSummary, Coupon, ShippingAddress};

/// Steps of the deterministic checkout flow.
///
/// The persisted step always names the state that should handle the *next*
/// inbound message: a handler that renders the following step's menu in the
/// same turn persists that following step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    None,
    Shipping,
    Coupon,
    Review,
    Order,
    Completed,
}

/// Working data accumulated while the checkout flow advances.
/// Cleared on completion or cancellation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutData {
    /// Address menu as last shown, so a bare number can be resolved.
    #[serde(default)]
    pub addresses: Vec<ShippingAddress>,
    /// Snapshot of the chosen address.
    #[serde(default)]
    pub selected_address: Option<ShippingAddress>,
    /// Coupon menu as last shown.
    #[serde(default)]
    pub available_coupons: Vec<Coupon>,
    /// Chosen coupon code, empty selection cleared via `None`.
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Cart snapshot taken when the final review was rendered.
    #[serde(default)]
    pub final_cart: Option<CartSummary>,
}

/// Persisted checkout flow state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutState {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub step: CheckoutStep,
    #[serde(default)]
    pub data: CheckoutData,
}

impl CheckoutState {
    /// Fresh state at flow entry.
    pub fn enter() -> Self {
        Self {
            active: true,
            step: CheckoutStep::Shipping,
            data: CheckoutData::default(),
        }
    }

    /// Resets to the inactive default, discarding working data.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_inactive_none() {
        let state = CheckoutState::default();
        assert!(!state.is_active());
        assert_eq!(state.step, CheckoutStep::None);
    }

    #[test]
    fn enter_starts_at_shipping() {
        let state = CheckoutState::enter();
        assert!(state.is_active());
        assert_eq!(state.step, CheckoutStep::Shipping);
        assert!(state.data.addresses.is_empty());
    }

    #[test]
    fn reset_clears_working_data() {
        let mut state = CheckoutState::enter();
        state.data.coupon_code = Some("SAVE10".to_string());
        state.reset();
        assert_eq!(state, CheckoutState::default());
    }

    #[test]
    fn step_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CheckoutStep::Shipping).unwrap(),
            "\"shipping\""
        );
        assert_eq!(
            serde_json::to_string(&CheckoutStep::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn unknown_fields_are_ignored_on_load() {
        let json = r#"{"active": true, "step": "coupon", "data": {}, "legacy_field": 1}"#;
        let state: CheckoutState = serde_json::from_str(json).unwrap();
        assert_eq!(state.step, CheckoutStep::Coupon);
    }

    #[test]
    fn missing_fields_default_safely() {
        let state: CheckoutState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, CheckoutState::default());
    }
}
