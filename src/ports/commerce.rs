//! Commerce Port - capability-provider interface for e-commerce state.
//!
//! The orchestration core treats product, cart, order, shipping, coupon
//! and PC-build persistence as a black box behind this trait. User
//! precondition problems (unknown product, empty cart) surface as typed
//! errors the callers convert to user-readable replies; they are never
//! allowed to escape a flow step.

use async_trait::async_trait;

use crate::domain::commerce::{
    CartItem, CartSummary, ComponentCategory, Coupon, CouponValidation, Order, OrderConfirmation,
    OrderRequest, PcBuild, PriceRange, Product, ProductQuery, ShippingAddress,
};
use crate::domain::foundation::{BuildId, CartItemId, OrderId, ProductId, SessionId, UserId};

/// Errors from the commerce capability provider.
#[derive(Debug, thiserror::Error)]
pub enum CommerceError {
    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected (bad quantity, ineligible order, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backing store could not be reached.
    #[error("commerce backend unavailable: {0}")]
    Unavailable(String),
}

/// Port for all e-commerce data operations.
#[async_trait]
pub trait CommerceService: Send + Sync {
    // --- catalog ---

    /// Searches products by name or description.
    async fn search_products(&self, query: &str, limit: u32)
        -> Result<Vec<Product>, CommerceError>;

    /// Lists products with optional filtering and sorting.
    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError>;

    /// Fetches one product by id.
    async fn product_details(&self, id: &ProductId) -> Result<Option<Product>, CommerceError>;

    /// Lists all catalog categories.
    async fn product_categories(&self) -> Result<Vec<String>, CommerceError>;

    /// Returns the catalog-wide price range.
    async fn price_range(&self) -> Result<PriceRange, CommerceError>;

    /// Lists products with stock at or below the threshold.
    async fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>, CommerceError>;

    // --- cart ---

    /// Returns the cart with computed totals.
    async fn cart_summary(&self, user: &UserId) -> Result<CartSummary, CommerceError>;

    /// Returns raw cart line items (with ids, for modification).
    async fn cart_items(&self, user: &UserId) -> Result<Vec<CartItem>, CommerceError>;

    /// Adds a product to the cart.
    async fn add_to_cart(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), CommerceError>;

    /// Removes one line item.
    async fn remove_cart_item(&self, item: &CartItemId) -> Result<(), CommerceError>;

    /// Sets a line item's quantity.
    async fn set_cart_quantity(&self, item: &CartItemId, quantity: u32)
        -> Result<(), CommerceError>;

    /// Increments a line item's quantity; returns the new quantity.
    async fn increase_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError>;

    /// Decrements a line item's quantity; at zero the item is removed.
    /// Returns the new quantity (zero when removed).
    async fn decrease_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError>;

    /// Empties the cart; returns the number of items removed.
    async fn empty_cart(&self, user: &UserId) -> Result<u32, CommerceError>;

    // --- orders ---

    /// Creates an order from the user's current cart.
    async fn create_order(
        &self,
        user: &UserId,
        request: OrderRequest,
    ) -> Result<OrderConfirmation, CommerceError>;

    /// Lists the user's orders, most recent first.
    async fn user_orders(&self, user: &UserId) -> Result<Vec<Order>, CommerceError>;

    /// Fetches one order by id.
    async fn order_details(&self, id: &OrderId) -> Result<Option<Order>, CommerceError>;

    /// Looks up an order by order number or tracking number. When a user
    /// id is given the lookup is scoped to that user's orders.
    async fn order_by_number(
        &self,
        number: &str,
        user: Option<&UserId>,
    ) -> Result<Option<Order>, CommerceError>;

    /// Cancels an order when its status allows it.
    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError>;

    // --- shipping ---

    /// Lists the user's saved shipping addresses.
    async fn shipping_addresses(&self, user: &UserId)
        -> Result<Vec<ShippingAddress>, CommerceError>;

    /// Saves a new shipping address.
    async fn add_shipping_address(
        &self,
        user: &UserId,
        address: ShippingAddress,
    ) -> Result<(), CommerceError>;

    // --- coupons ---

    /// Validates a coupon code against a cart total.
    async fn validate_coupon(
        &self,
        code: &str,
        cart_total: f64,
        user: &UserId,
    ) -> Result<CouponValidation, CommerceError>;

    /// Lists all active, still-usable coupon codes.
    async fn available_coupons(&self) -> Result<Vec<Coupon>, CommerceError>;

    // --- custom PC builds ---

    /// Starts a new build record; anonymous builds are keyed by session.
    async fn start_build(
        &self,
        user: Option<&UserId>,
        session: &SessionId,
    ) -> Result<BuildId, CommerceError>;

    /// Fetches a build record.
    async fn build(&self, id: &BuildId) -> Result<Option<PcBuild>, CommerceError>;

    /// Registers a chosen component against a build.
    async fn add_build_component(
        &self,
        id: &BuildId,
        category: ComponentCategory,
        product: &ProductId,
    ) -> Result<(), CommerceError>;

    /// Moves all chosen components into the owner's cart; returns the
    /// number of components added.
    async fn save_build_to_cart(&self, id: &BuildId) -> Result<u32, CommerceError>;
}
