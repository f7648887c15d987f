//! Tool Executor - dispatches requested invocations against the injected
//! capability providers.
//!
//! Arguments are validated for presence and range before dispatch. Tools
//! that operate on personal state resolve the user from the session
//! context, never from model-supplied arguments. A missing user yields a
//! structured `login_required` result with a user-facing message.

use std::sync::Arc;

use serde_json::json;

use crate::domain::commerce::{
    Order, OrderRequest, ProductQuery, ProductSort, ShippingAddress,
};
use crate::domain::foundation::{CartItemId, OrderId, ProductId, UserId};
use crate::ports::{CommerceError, CommerceService, KnowledgeRetriever};

use super::catalog::names;
use super::{ToolCall, ToolResult};

/// Executes tool invocations against the commerce and knowledge providers.
#[derive(Clone)]
pub struct ToolExecutor {
    commerce: Arc<dyn CommerceService>,
    knowledge: Arc<dyn KnowledgeRetriever>,
}

impl ToolExecutor {
    /// Creates an executor with its providers injected.
    pub fn new(commerce: Arc<dyn CommerceService>, knowledge: Arc<dyn KnowledgeRetriever>) -> Self {
        Self {
            commerce,
            knowledge,
        }
    }

    /// Executes one invocation. Never returns an error: every failure
    /// mode is a [`ToolResult`] the model can relay.
    pub async fn execute(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        tracing::debug!(tool = %call.name, "executing tool");

        match call.name.as_str() {
            names::SEARCH_PRODUCTS => self.search_products(call).await,
            names::GET_PRODUCTS => self.get_products(call).await,
            names::GET_PRODUCT_DETAILS => self.get_product_details(call).await,
            names::GET_PRODUCT_CATEGORIES => self.get_product_categories().await,
            names::GET_PRODUCTS_BY_CATEGORY => self.get_products_by_category(call).await,
            names::GET_FEATURED_PRODUCTS => self.get_featured_products(call).await,
            names::GET_PRICE_RANGE => self.get_price_range().await,
            names::GET_LOW_STOCK_PRODUCTS => self.get_low_stock(call).await,
            names::ADD_TO_CART => self.add_to_cart(call, user).await,
            names::GET_CART_SUMMARY => self.get_cart_summary(user).await,
            names::GET_CART_ITEMS => self.get_cart_items(user).await,
            names::REMOVE_FROM_CART => self.remove_from_cart(call).await,
            names::SET_CART_QUANTITY => self.set_cart_quantity(call).await,
            names::INCREASE_QUANTITY => self.increase_quantity(call).await,
            names::DECREASE_QUANTITY => self.decrease_quantity(call).await,
            names::EMPTY_CART => self.empty_cart(user).await,
            names::UPDATE_QUANTITY_BY_PRODUCT => self.update_quantity_by_product(call, user).await,
            names::GET_ORDERS => self.get_orders(user).await,
            names::GET_ORDER_DETAILS => self.get_order_details(call).await,
            names::TRACK_ORDER => self.track_order(call, user).await,
            names::CANCEL_ORDER => self.cancel_order(call).await,
            names::CREATE_ORDER => self.create_order(call, user).await,
            names::GET_SHIPPING_ADDRESSES => self.get_shipping_addresses(user).await,
            names::ADD_SHIPPING_ADDRESS => self.add_shipping_address(call, user).await,
            names::VALIDATE_COUPON => self.validate_coupon(call, user).await,
            names::GET_AVAILABLE_COUPONS => self.get_available_coupons().await,
            names::SEARCH_KNOWLEDGE_BASE => self.search_knowledge(call).await,
            names::GET_PRODUCT_INFORMATION => self.get_product_information(call).await,
            other => ToolResult::failed(format!("Unknown tool: {other}")),
        }
    }

    // --- catalog ---

    async fn search_products(&self, call: &ToolCall) -> ToolResult {
        let Some(query) = call.required_str("query") else {
            return ToolResult::failed("A search query is required");
        };
        let limit = call.u32_arg("limit").unwrap_or(10);
        match self.commerce.search_products(query, limit).await {
            Ok(products) => ToolResult::success(json!({ "products": products })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_products(&self, call: &ToolCall) -> ToolResult {
        let sort = call.str_arg("sort_by").and_then(|s| match s {
            "price_asc" => Some(ProductSort::PriceAsc),
            "price_desc" => Some(ProductSort::PriceDesc),
            "name_asc" => Some(ProductSort::NameAsc),
            "rating_desc" => Some(ProductSort::RatingDesc),
            _ => None,
        });
        let query = ProductQuery {
            limit: call.u32_arg("limit").unwrap_or(20),
            category: call.str_arg("category").map(str::to_string),
            min_price: call.f64_arg("min_price"),
            max_price: call.f64_arg("max_price"),
            sort,
        };
        match self.commerce.list_products(query).await {
            Ok(products) => ToolResult::success(json!({ "products": products })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_product_details(&self, call: &ToolCall) -> ToolResult {
        let Some(id) = call.required_str("product_id") else {
            return ToolResult::failed("product_id is required");
        };
        match self.commerce.product_details(&ProductId::new(id)).await {
            Ok(Some(product)) => ToolResult::success(json!({ "product": product })),
            Ok(None) => ToolResult::failed("Product not found"),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_product_categories(&self) -> ToolResult {
        match self.commerce.product_categories().await {
            Ok(categories) => ToolResult::success(json!({ "categories": categories })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_products_by_category(&self, call: &ToolCall) -> ToolResult {
        let Some(category) = call.required_str("category") else {
            return ToolResult::failed("category is required");
        };
        let limit = call.u32_arg("limit").unwrap_or(20);
        match self
            .commerce
            .list_products(ProductQuery::category(category, limit))
            .await
        {
            Ok(products) => {
                ToolResult::success(json!({ "products": products, "category": category }))
            }
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_featured_products(&self, call: &ToolCall) -> ToolResult {
        let query = ProductQuery {
            limit: call.u32_arg("limit").unwrap_or(10),
            sort: Some(ProductSort::RatingDesc),
            ..Default::default()
        };
        match self.commerce.list_products(query).await {
            Ok(products) => ToolResult::success(json!({ "products": products })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_price_range(&self) -> ToolResult {
        match self.commerce.price_range().await {
            Ok(range) => ToolResult::success(json!({ "min": range.min, "max": range.max })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_low_stock(&self, call: &ToolCall) -> ToolResult {
        let threshold = call.i64_arg("threshold").unwrap_or(10);
        match self.commerce.low_stock_products(threshold).await {
            Ok(products) => {
                ToolResult::success(json!({ "products": products, "threshold": threshold }))
            }
            Err(e) => commerce_failure(e),
        }
    }

    // --- cart ---

    async fn add_to_cart(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I'd be happy to help you add items to your cart! However, I need you to be \
             logged in first. Please login to your account so I can access your personal cart.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        let Some(product_id) = call.required_str("product_id") else {
            return ToolResult::failed("product_id is required");
        };
        let quantity = call.u32_arg("quantity").unwrap_or(1);
        if quantity < 1 {
            return ToolResult::failed("Quantity must be at least 1");
        }
        match self
            .commerce
            .add_to_cart(user, &ProductId::new(product_id), quantity)
            .await
        {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "message": format!("Added {quantity} item(s) to your cart."),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_cart_summary(&self, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I'd love to show you your cart! However, I need you to be logged in first \
             to access your personal shopping cart.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        match self.commerce.cart_summary(user).await {
            Ok(summary) => {
                let message = if summary.is_empty() {
                    "Your cart is empty.".to_string()
                } else {
                    let lines: Vec<String> = summary
                        .items
                        .iter()
                        .map(|i| {
                            format!(
                                "- {} x{} - ${:.2}",
                                i.product_name,
                                i.quantity,
                                i.line_total()
                            )
                        })
                        .collect();
                    format!(
                        "Your cart has {} item(s) totaling ${:.2}:\n{}",
                        summary.total_items,
                        summary.total_price,
                        lines.join("\n")
                    )
                };
                ToolResult::success(json!({
                    "success": true,
                    "items": summary.items,
                    "total_items": summary.total_items,
                    "total_price": summary.total_price,
                    "message": message,
                }))
            }
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_cart_items(&self, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I need you to be logged in to view your cart items.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        match self.commerce.cart_items(user).await {
            Ok(items) => ToolResult::success(json!({ "success": true, "items": items })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn remove_from_cart(&self, call: &ToolCall) -> ToolResult {
        let Some(item_id) = call.required_str("cart_item_id") else {
            return ToolResult::failed("cart_item_id is required");
        };
        match self
            .commerce
            .remove_cart_item(&CartItemId::new(item_id))
            .await
        {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "message": "Item removed from your cart.",
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn set_cart_quantity(&self, call: &ToolCall) -> ToolResult {
        let Some(item_id) = call.required_str("cart_item_id") else {
            return ToolResult::failed("cart_item_id is required");
        };
        let Some(quantity) = call.u32_arg("quantity") else {
            return ToolResult::failed("quantity is required");
        };
        if quantity < 1 {
            return ToolResult::failed("Quantity must be at least 1");
        }
        match self
            .commerce
            .set_cart_quantity(&CartItemId::new(item_id), quantity)
            .await
        {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "message": format!("Quantity updated to {quantity}."),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn increase_quantity(&self, call: &ToolCall) -> ToolResult {
        let Some(item_id) = call.required_str("cart_item_id") else {
            return ToolResult::failed("cart_item_id is required");
        };
        match self
            .commerce
            .increase_quantity(&CartItemId::new(item_id))
            .await
        {
            Ok(quantity) => ToolResult::success(json!({
                "success": true,
                "quantity": quantity,
                "message": format!("Quantity increased to {quantity}."),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn decrease_quantity(&self, call: &ToolCall) -> ToolResult {
        let Some(item_id) = call.required_str("cart_item_id") else {
            return ToolResult::failed("cart_item_id is required");
        };
        match self
            .commerce
            .decrease_quantity(&CartItemId::new(item_id))
            .await
        {
            Ok(0) => ToolResult::success(json!({
                "success": true,
                "quantity": 0,
                "message": "Item removed from your cart.",
            })),
            Ok(quantity) => ToolResult::success(json!({
                "success": true,
                "quantity": quantity,
                "message": format!("Quantity decreased to {quantity}."),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn empty_cart(&self, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I can help you empty your cart! However, I need you to be logged in first \
             to access your personal shopping cart.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        match self.commerce.empty_cart(user).await {
            Ok(removed) => ToolResult::success(json!({
                "success": true,
                "removed": removed,
                "message": format!("Cart cleared successfully! Removed {removed} item(s)."),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn update_quantity_by_product(
        &self,
        call: &ToolCall,
        user: Option<&UserId>,
    ) -> ToolResult {
        let user = match require_user(user, "I need you to be logged in to modify your cart.") {
            Ok(user) => user,
            Err(result) => return result,
        };
        let Some(product_name) = call.required_str("product_name") else {
            return ToolResult::failed("product_name is required");
        };
        let Some(quantity) = call.u32_arg("quantity") else {
            return ToolResult::failed("quantity is required");
        };
        if quantity < 1 {
            return ToolResult::failed("Quantity must be at least 1");
        }

        let items = match self.commerce.cart_items(user).await {
            Ok(items) => items,
            Err(e) => return commerce_failure(e),
        };

        let wanted = product_name.to_lowercase();
        let target = items.iter().find(|item| {
            let name = item.product_name.to_lowercase();
            name.contains(&wanted) || wanted.contains(&name)
        });

        let Some(target) = target else {
            return ToolResult::failed(format!(
                "I couldn't find '{product_name}' in your cart. Please check the product \
                 name or add it to cart first."
            ));
        };

        match self.commerce.set_cart_quantity(&target.id, quantity).await {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "product_name": target.product_name,
                "message": format!("Updated {} quantity to {quantity}", target.product_name),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    // --- orders ---

    async fn get_orders(&self, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I can help you check your orders! However, I need you to be logged in first \
             to access your order history.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        match self.commerce.user_orders(user).await {
            Ok(orders) => ToolResult::success(json!({ "success": true, "orders": orders })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_order_details(&self, call: &ToolCall) -> ToolResult {
        let Some(order_id) = call.required_str("order_id") else {
            return ToolResult::failed("order_id is required");
        };
        match self.commerce.order_details(&OrderId::new(order_id)).await {
            Ok(Some(order)) => ToolResult::success(json!({ "success": true, "order": order })),
            Ok(None) => ToolResult::failed("Order not found"),
            Err(e) => commerce_failure(e),
        }
    }

    async fn track_order(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        let Some(number) = call.required_str("order_number") else {
            return ToolResult::failed("Order number or tracking number is required");
        };
        match self.commerce.order_by_number(number, user).await {
            Ok(Some(order)) => {
                let message = format_order_tracking(&order);
                ToolResult::success(json!({
                    "success": true,
                    "order": order,
                    "message": message,
                }))
            }
            Ok(None) => ToolResult::failed(
                "Order not found. Please check the order number or tracking number and try again.",
            ),
            Err(e) => commerce_failure(e),
        }
    }

    async fn cancel_order(&self, call: &ToolCall) -> ToolResult {
        let Some(order_id) = call.required_str("order_id") else {
            return ToolResult::failed("order_id is required");
        };
        match self.commerce.cancel_order(&OrderId::new(order_id)).await {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "message": "Your order has been cancelled.",
                "needs_approval": true,
                "approval_type": "order_cancellation",
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn create_order(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I'd be happy to help you place an order! However, I need you to be logged in \
             first to process your order.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        let address = match address_from_args(call) {
            Ok(address) => address,
            Err(result) => return result,
        };
        let coupon_code = call.required_str("coupon_code").map(str::to_string);

        let request = OrderRequest::assistant_order(address, coupon_code);
        match self.commerce.create_order(user, request).await {
            Ok(confirmation) => ToolResult::success(json!({
                "success": true,
                "order_id": confirmation.order_id,
                "order_number": confirmation.order_number,
                "tracking_number": confirmation.tracking_number,
                "total_amount": confirmation.total_amount,
                "message": format!(
                    "🎉 **Order Placed Successfully!**\n\nOrder Number: #{}\nTotal: ${:.2}\n\n\
                     Thank you for your purchase! You'll receive updates on your order status.",
                    confirmation.order_number, confirmation.total_amount
                ),
                "needs_approval": true,
                "approval_type": "final_order_confirmation",
            })),
            Err(e) => commerce_failure(e),
        }
    }

    // --- shipping ---

    async fn get_shipping_addresses(&self, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I can help you view your saved shipping addresses! However, I need you to be \
             logged in first to access your personal information.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        match self.commerce.shipping_addresses(user).await {
            Ok(addresses) => {
                ToolResult::success(json!({ "success": true, "addresses": addresses }))
            }
            Err(e) => commerce_failure(e),
        }
    }

    async fn add_shipping_address(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I'd be happy to help you add a shipping address! However, I need you to be \
             logged in first.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        let address = match address_from_args(call) {
            Ok(address) => address,
            Err(result) => return result,
        };
        match self.commerce.add_shipping_address(user, address).await {
            Ok(()) => ToolResult::success(json!({
                "success": true,
                "message": "Shipping address saved.",
            })),
            Err(e) => commerce_failure(e),
        }
    }

    // --- coupons ---

    async fn validate_coupon(&self, call: &ToolCall, user: Option<&UserId>) -> ToolResult {
        let user = match require_user(
            user,
            "I need you to be logged in to apply coupon codes.",
        ) {
            Ok(user) => user,
            Err(result) => return result,
        };
        let Some(code) = call.required_str("coupon_code") else {
            return ToolResult::failed("Please provide a coupon code to validate");
        };
        let Some(cart_total) = call.f64_arg("cart_total") else {
            return ToolResult::failed("cart_total is required");
        };
        if cart_total < 0.0 {
            return ToolResult::failed("Invalid cart total");
        }
        match self.commerce.validate_coupon(code, cart_total, user).await {
            Ok(validation) if validation.valid => ToolResult::success(json!({
                "success": true,
                "valid": true,
                "discount": validation.discount,
                "new_total": validation.new_total,
                "message": format!(
                    "Great! Coupon '{code}' applied successfully. You saved ${:.2}!",
                    validation.discount
                ),
            })),
            Ok(validation) => ToolResult::success(json!({
                "success": false,
                "valid": false,
                "message": validation
                    .message
                    .unwrap_or_else(|| "Coupon could not be applied".to_string()),
            })),
            Err(e) => commerce_failure(e),
        }
    }

    async fn get_available_coupons(&self) -> ToolResult {
        match self.commerce.available_coupons().await {
            Ok(coupons) => ToolResult::success(json!({ "success": true, "coupons": coupons })),
            Err(e) => commerce_failure(e),
        }
    }

    // --- knowledge ---

    async fn search_knowledge(&self, call: &ToolCall) -> ToolResult {
        let Some(query) = call.required_str("query") else {
            return ToolResult::failed("A search query is required");
        };
        match self.knowledge.search(query, 3).await {
            Ok(results) if results.is_empty() => ToolResult::success(json!({
                "success": false,
                "message": "No relevant information found",
                "results": [],
            })),
            Ok(results) => ToolResult::success(json!({
                "success": true,
                "message": format!("Found {} relevant documents", results.len()),
                "results": results,
            })),
            Err(e) => ToolResult::failed(format!("Error searching knowledge base: {e}")),
        }
    }

    async fn get_product_information(&self, call: &ToolCall) -> ToolResult {
        let Some(query) = call.required_str("product_query") else {
            return ToolResult::failed("product_query is required");
        };
        // Try a product-scoped query first, then the raw query.
        let scoped = format!("product {query}");
        let context = match self.knowledge.get_context(&scoped, 800).await {
            Ok(context) if !context.is_empty() => context,
            _ => match self.knowledge.get_context(query, 800).await {
                Ok(context) => context,
                Err(e) => {
                    return ToolResult::failed(format!(
                        "Error retrieving product information: {e}"
                    ))
                }
            },
        };
        ToolResult::success(json!({
            "success": true,
            "information": context,
            "query": query,
        }))
    }
}

/// Resolves the session user or produces the login-required result.
fn require_user<'a>(
    user: Option<&'a UserId>,
    message: &str,
) -> Result<&'a UserId, ToolResult> {
    match user {
        Some(user) if !user.is_blank() => Ok(user),
        _ => Err(ToolResult::login_required(message)),
    }
}

/// Builds a shipping address from tool arguments.
fn address_from_args(call: &ToolCall) -> Result<ShippingAddress, ToolResult> {
    let field = |name: &str| -> Result<String, ToolResult> {
        call.required_str(name)
            .map(str::to_string)
            .ok_or_else(|| ToolResult::failed(format!("{name} is required")))
    };
    Ok(ShippingAddress {
        full_name: field("full_name")?,
        address: field("address")?,
        city: field("city")?,
        postal_code: field("postal_code")?,
        country: call
            .required_str("country")
            .unwrap_or("Pakistan")
            .to_string(),
    })
}

/// Converts a commerce failure into a user-actionable result.
fn commerce_failure(error: CommerceError) -> ToolResult {
    match error {
        CommerceError::NotFound(what) => ToolResult::failed(format!("Not found: {what}")),
        CommerceError::InvalidRequest(reason) => ToolResult::failed(reason),
        CommerceError::Unavailable(_) => ToolResult::failed(
            "Sorry, the store is temporarily unavailable. Please try again in a moment.",
        ),
    }
}

/// Formats the user-facing order tracking message.
fn format_order_tracking(order: &Order) -> String {
    let tracking = order
        .tracking_number
        .clone()
        .unwrap_or_else(|| "Not assigned yet".to_string());

    let mut parts = vec![
        "📦 **Order Tracking Information**\n".to_string(),
        format!("**Order Number:** #{}", order.order_number),
        format!("**Status:** {} {}", order.status.status_icon(), order.status),
        format!("**Tracking Number:** {tracking}"),
        format!("**Total Amount:** ${:.2}", order.total_amount),
    ];

    if !order.items.is_empty() {
        parts.push("\n**Items:**".to_string());
        for item in order.items.iter().take(5) {
            parts.push(format!(
                "- {} (Qty: {}) - ${:.2}",
                item.name, item.quantity, item.price
            ));
        }
        if order.items.len() > 5 {
            parts.push(format!("... and {} more item(s)", order.items.len() - 5));
        }
    }

    if let Some(created) = &order.created_at {
        parts.push(format!("\n**Order Date:** {}", created.order_date_format()));
    }

    parts.join("\n")
}
