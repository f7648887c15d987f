//! Checkout step handlers.
//!
//! Each handler consumes the user's reply for the persisted step, talks to
//! the commerce provider, and returns both the rendered reply and the
//! state to persist. When a selection is accepted the handler renders the
//! *next* step's menu in the same turn, so the persisted step always
//! names the state that will interpret the following message.
//!
//! No error escapes a handler: commerce failures become a user-facing
//! "Error during checkout" turn and the flow resets to a safe state.

use std::sync::Arc;

use crate::domain::commerce::{CartSummary, Coupon, OrderRequest, ShippingAddress};
use crate::domain::conversation::input::{self, CouponChoice};
use crate::domain::foundation::UserId;
use crate::ports::{CommerceError, CommerceService};

use super::{CheckoutState, CheckoutStep};

/// Result of one checkout turn: the reply to show and the state to
/// persist for the next message.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub reply: String,
    pub state: CheckoutState,
}

impl CheckoutOutcome {
    fn stay(reply: impl Into<String>, state: CheckoutState) -> Self {
        Self {
            reply: reply.into(),
            state,
        }
    }

    fn reset(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            state: CheckoutState::default(),
        }
    }
}

/// The deterministic checkout flow.
#[derive(Clone)]
pub struct CheckoutFlow {
    commerce: Arc<dyn CommerceService>,
}

impl CheckoutFlow {
    pub fn new(commerce: Arc<dyn CommerceService>) -> Self {
        Self { commerce }
    }

    /// Handles one turn at the given step.
    pub async fn handle(
        &self,
        step: CheckoutStep,
        state: CheckoutState,
        user: Option<&UserId>,
        user_input: &str,
    ) -> CheckoutOutcome {
        tracing::debug!(?step, "checkout turn");

        let result = match step {
            CheckoutStep::None | CheckoutStep::Shipping => {
                self.shipping_step(state, user, user_input).await
            }
            CheckoutStep::Coupon => self.coupon_step(state, user, user_input).await,
            CheckoutStep::Review => self.review_step(state, user, user_input).await,
            CheckoutStep::Order => self.order_step(state, user).await,
            CheckoutStep::Completed => Ok(CheckoutOutcome::reset(
                "Your checkout is complete. You can start a new one anytime!",
            )),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "checkout step failed; resetting flow");
            CheckoutOutcome::reset(format!("Error during checkout: {e}"))
        })
    }

    /// Shipping step: first entry renders the address menu; a later entry
    /// with a cached menu resolves the selection and renders the coupon
    /// menu in the same turn.
    async fn shipping_step(
        &self,
        mut state: CheckoutState,
        user: Option<&UserId>,
        user_input: &str,
    ) -> Result<CheckoutOutcome, CommerceError> {
        if !state.data.addresses.is_empty() {
            if let Some(index) = input::address_selection(user_input) {
                let count = state.data.addresses.len();
                if index >= 1 && (index as usize) <= count {
                    let selected = state.data.addresses[index as usize - 1].clone();
                    state.data.selected_address = Some(selected.clone());

                    let coupons = self.commerce.available_coupons().await?;
                    state.data.available_coupons = coupons.clone();
                    state.active = true;
                    state.step = CheckoutStep::Coupon;

                    let mut reply = format!(
                        "✅ Shipping to: **{}**, {}.\n\n",
                        selected.full_name, selected.city
                    );
                    reply.push_str(&render_coupon_menu(&coupons));
                    return Ok(CheckoutOutcome::stay(reply, state));
                }
                return Ok(CheckoutOutcome::stay(
                    format!(
                        "Invalid address selection. Please choose a number between 1 and {count}."
                    ),
                    state,
                ));
            }

            // Unmatched reply with a menu on screen: repeat the menu, the
            // instruction line tells the user what we expect.
            let cart = self.commerce.cart_summary(required_user(user)?).await?;
            let reply = render_address_menu(&cart, &state.data.addresses);
            return Ok(CheckoutOutcome::stay(reply, state));
        }

        // First entry: preconditions, then render the menu.
        let Some(user) = user.filter(|u| !u.is_blank()) else {
            return Ok(CheckoutOutcome::reset(
                "I need you to be logged in to proceed with checkout.",
            ));
        };

        let cart = self.commerce.cart_summary(user).await?;
        if cart.is_empty() {
            return Ok(CheckoutOutcome::reset(
                "Your cart is empty. Please add some items before proceeding to checkout.",
            ));
        }

        let addresses = self.commerce.shipping_addresses(user).await?;
        if addresses.is_empty() {
            return Ok(CheckoutOutcome::reset(
                "You don't have any shipping addresses saved. Please add a shipping address first.",
            ));
        }

        let reply = render_address_menu(&cart, &addresses);
        state.active = true;
        state.step = CheckoutStep::Shipping;
        state.data.addresses = addresses;
        Ok(CheckoutOutcome::stay(reply, state))
    }

    /// Coupon step: a selection or a decline renders the final review in
    /// the same turn; anything else re-renders the coupon menu.
    async fn coupon_step(
        &self,
        mut state: CheckoutState,
        user: Option<&UserId>,
        user_input: &str,
    ) -> Result<CheckoutOutcome, CommerceError> {
        if let Some(choice) = input::coupon_selection(user_input) {
            let coupons = &state.data.available_coupons;
            let code = match choice {
                CouponChoice::Index(n) => {
                    if n >= 1 && (n as usize) <= coupons.len() {
                        coupons[n as usize - 1].code.clone()
                    } else {
                        let count = coupons.len();
                        return Ok(CheckoutOutcome::stay(
                            format!(
                                "Invalid coupon number. Please choose between 1 and {count}."
                            ),
                            state,
                        ));
                    }
                }
                CouponChoice::Code(code) => code,
            };

            state.data.coupon_code = Some(code.clone());
            let prefix = format!("✅ Coupon **{code}** applied!\n\n");
            return self.advance_to_review(state, user, &prefix).await;
        }

        if input::declines_coupon(user_input) {
            state.data.coupon_code = None;
            return self.advance_to_review(state, user, "").await;
        }

        // Idempotent re-render of the coupon menu.
        let reply = render_coupon_menu(&state.data.available_coupons);
        Ok(CheckoutOutcome::stay(reply, state))
    }

    /// Renders the final review and persists the review step.
    async fn advance_to_review(
        &self,
        mut state: CheckoutState,
        user: Option<&UserId>,
        prefix: &str,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let cart = self.commerce.cart_summary(required_user(user)?).await?;
        if cart.is_empty() {
            return Ok(CheckoutOutcome::reset(
                "Your cart is empty. Checkout has been cancelled.",
            ));
        }

        let Some(address) = state.data.selected_address.clone() else {
            return Ok(CheckoutOutcome::reset(
                "No shipping address found. Please restart checkout.",
            ));
        };

        state.data.final_cart = Some(cart.clone());
        state.active = true;
        state.step = CheckoutStep::Review;

        let reply = format!(
            "{prefix}{}",
            render_review(&cart, &address, state.data.coupon_code.as_deref())
        );
        Ok(CheckoutOutcome::stay(reply, state))
    }

    /// Review step: confirmation places the order synchronously; cancel
    /// exits; anything else re-renders the review.
    async fn review_step(
        &self,
        state: CheckoutState,
        user: Option<&UserId>,
        user_input: &str,
    ) -> Result<CheckoutOutcome, CommerceError> {
        if input::cancels(user_input) {
            return Ok(CheckoutOutcome::reset(
                "🔙 Checkout cancelled. Your cart is still saved.",
            ));
        }

        if input::confirms_order(user_input) {
            return Ok(self.place_order(&state, user).await);
        }

        // Re-render the review with a fresh cart total.
        let cart = self.commerce.cart_summary(required_user(user)?).await?;
        if cart.is_empty() {
            return Ok(CheckoutOutcome::reset(
                "Your cart is empty. Checkout has been cancelled.",
            ));
        }
        let Some(address) = state.data.selected_address.clone() else {
            return Ok(CheckoutOutcome::reset(
                "No shipping address found. Please restart checkout.",
            ));
        };
        let reply = render_review(&cart, &address, state.data.coupon_code.as_deref());
        Ok(CheckoutOutcome::stay(reply, state))
    }

    /// Order step: normally short-circuited by the review step, but
    /// reachable if a turn persisted mid-confirmation.
    async fn order_step(
        &self,
        state: CheckoutState,
        user: Option<&UserId>,
    ) -> Result<CheckoutOutcome, CommerceError> {
        Ok(self.place_order(&state, user).await)
    }

    /// Creates the order from the snapshotted address and coupon. Every
    /// outcome resets the flow; only the reply differs.
    async fn place_order(&self, state: &CheckoutState, user: Option<&UserId>) -> CheckoutOutcome {
        let user = match required_user(user) {
            Ok(user) => user,
            Err(_) => {
                return CheckoutOutcome::reset(
                    "I need you to be logged in to place an order.",
                )
            }
        };

        let Some(address) = state.data.selected_address.clone() else {
            return CheckoutOutcome::reset("No shipping address found. Please restart checkout.");
        };

        let cart = match self.commerce.cart_summary(user).await {
            Ok(cart) if !cart.is_empty() => cart,
            Ok(_) => return CheckoutOutcome::reset("Your cart is empty. Cannot place order."),
            Err(e) => return CheckoutOutcome::reset(format!("❌ Error placing order: {e}")),
        };

        let request = OrderRequest::assistant_order(address, state.data.coupon_code.clone());
        match self.commerce.create_order(user, request).await {
            Ok(confirmation) => {
                let tracking = confirmation
                    .tracking_number
                    .unwrap_or_else(|| "Will be updated soon".to_string());
                let total = if confirmation.total_amount > 0.0 {
                    confirmation.total_amount
                } else {
                    cart.total_price
                };
                CheckoutOutcome::reset(format!(
                    "🎉 **Order Placed Successfully!**\n\n\
                     **Order Number:** #{}\n\
                     **Order ID:** {}\n\
                     **Tracking Number:** {}\n\
                     **Total Amount:** ${:.2}\n\
                     **Estimated Delivery:** 3-5 business days\n\n\
                     Thank you for shopping with us! 🛍️",
                    confirmation.order_number, confirmation.order_id, tracking, total
                ))
            }
            Err(e) => CheckoutOutcome::reset(format!("❌ Error placing order: {e}")),
        }
    }
}

fn required_user(user: Option<&UserId>) -> Result<&UserId, CommerceError> {
    user.filter(|u| !u.is_blank())
        .ok_or_else(|| CommerceError::InvalidRequest("login required".to_string()))
}

/// Renders the cart summary plus numbered address menu.
fn render_address_menu(cart: &CartSummary, addresses: &[ShippingAddress]) -> String {
    let mut message = format!(
        "🛒 **Checkout Review**\n\n**Cart Summary:** {} items - Total: ${:.2}\n\n\
         **Available Shipping Addresses:**\n",
        cart.items.len(),
        cart.total_price
    );
    for (i, addr) in addresses.iter().enumerate() {
        message.push_str(&format!("{}. {}\n\n", i + 1, addr.menu_lines()));
    }
    message.push_str("Please select your address by typing the number (e.g., \"1\")");
    message
}

/// Renders the numbered coupon menu, or the no-coupons notice.
fn render_coupon_menu(coupons: &[Coupon]) -> String {
    if coupons.is_empty() {
        return "No coupon codes available at the moment.\n\n\
                Type \"skip\" to continue to the final review."
            .to_string();
    }

    let mut message = String::from("💰 **Available Coupons:**\n");
    for (idx, coupon) in coupons.iter().enumerate() {
        message.push_str(&format!(
            "{}. **{}** - {} ({} uses left)\n",
            idx + 1,
            coupon.code,
            coupon.discount_label(),
            coupon.remaining_uses()
        ));
    }
    message.push_str(
        "\nWould you like to apply a coupon?\n\
         Type the coupon number (e.g., \"1\") or \"skip\" to continue.",
    );
    message
}

/// Renders the final order review.
fn render_review(cart: &CartSummary, address: &ShippingAddress, coupon: Option<&str>) -> String {
    let mut message = String::from("📋 **Final Order Review**\n\n**Items:**\n");
    for item in &cart.items {
        message.push_str(&format!(
            "• {} x{} - ${:.2}\n",
            item.product_name,
            item.quantity,
            item.line_total()
        ));
    }
    message.push_str(&format!("\n**Subtotal:** ${:.2}\n", cart.total_price));
    if let Some(code) = coupon {
        message.push_str(&format!("**Coupon ({code}):** Applied\n"));
    }
    message.push_str(&format!("**Total:** ${:.2}\n\n", cart.total_price));
    message.push_str(&format!(
        "**Shipping Address:**\n{}\n\n",
        address.review_block()
    ));
    message.push_str("**Payment Method:** Cash on Delivery\n\n");
    message.push_str("✅ Type 'yes' or 'confirm' to place your order");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "Lahore".to_string(),
            postal_code: "54000".to_string(),
            country: "Pakistan".to_string(),
        }
    }

    fn cart() -> CartSummary {
        CartSummary::from_items(vec![crate::domain::commerce::CartItem {
            id: crate::domain::foundation::CartItemId::new("c1"),
            product_id: crate::domain::foundation::ProductId::new("p1"),
            product_name: "Mechanical Keyboard".to_string(),
            unit_price: 80.0,
            quantity: 2,
        }])
    }

    #[test]
    fn address_menu_numbers_entries() {
        let menu = render_address_menu(&cart(), &[address(), address()]);
        assert!(menu.contains("1. Ada Lovelace"));
        assert!(menu.contains("2. Ada Lovelace"));
        assert!(menu.contains("Total: $160.00"));
        assert!(menu.contains("typing the number"));
    }

    #[test]
    fn address_menu_is_deterministic() {
        let addresses = [address()];
        assert_eq!(
            render_address_menu(&cart(), &addresses),
            render_address_menu(&cart(), &addresses)
        );
    }

    #[test]
    fn coupon_menu_lists_codes_with_labels() {
        let coupons = vec![Coupon {
            code: "SAVE10".to_string(),
            kind: crate::domain::commerce::CouponKind::Percentage,
            value: 10.0,
            min_cart_value: 0.0,
            max_uses: 100,
            times_used: 25,
        }];
        let menu = render_coupon_menu(&coupons);
        assert!(menu.contains("1. **SAVE10** - 10% off (75 uses left)"));
        assert!(menu.contains("\"skip\""));
    }

    #[test]
    fn empty_coupon_menu_offers_skip() {
        let menu = render_coupon_menu(&[]);
        assert!(menu.contains("No coupon codes available"));
        assert!(menu.contains("skip"));
    }

    #[test]
    fn review_shows_items_coupon_and_address() {
        let review = render_review(&cart(), &address(), Some("SAVE10"));
        assert!(review.contains("• Mechanical Keyboard x2 - $160.00"));
        assert!(review.contains("**Coupon (SAVE10):** Applied"));
        assert!(review.contains("Ada Lovelace"));
        assert!(review.contains("Cash on Delivery"));
    }

    #[test]
    fn review_omits_coupon_line_when_none() {
        let review = render_review(&cart(), &address(), None);
        assert!(!review.contains("Coupon ("));
    }
}
