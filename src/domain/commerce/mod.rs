//! Commerce value objects.
//!
//! Mirrors the document shapes served by the storefront backend (products,
//! carts, orders, shipping addresses, coupons, custom PC builds). These are
//! plain data carriers; all persistence lives behind the capability ports.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{BuildId, CartItemId, OrderId, ProductId, Timestamp};

/// A product in the store catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub rating: Option<f32>,
}

impl Product {
    /// Short description for numbered menus, truncated to 80 characters.
    pub fn menu_blurb(&self) -> Option<String> {
        self.description.as_ref().map(|d| {
            if d.chars().count() > 80 {
                let cut: String = d.chars().take(80).collect();
                format!("{cut}...")
            } else {
                d.clone()
            }
        })
    }
}

/// Sort orders supported by product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    RatingDesc,
}

/// Filter set for product listing queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub limit: u32,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<ProductSort>,
}

impl ProductQuery {
    /// Listing limited to a category, as used by the PC-builder menus.
    pub fn category(category: impl Into<String>, limit: u32) -> Self {
        Self {
            limit,
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

/// Catalog-wide price range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// A line item in a customer's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Cart contents with computed totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: f64,
}

impl CartSummary {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total_items = items.iter().map(|i| i.quantity).sum();
        let total_price = items.iter().map(|i| i.line_total()).sum();
        Self {
            items,
            total_items,
            total_price,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// One menu entry line: name on the first line, address details indented.
    pub fn menu_lines(&self) -> String {
        format!(
            "{}\n   {}, {}, {}, {}",
            self.full_name, self.address, self.city, self.postal_code, self.country
        )
    }

    /// Multi-line block for order reviews.
    pub fn review_block(&self) -> String {
        format!(
            "{}\n{}\n{}, {}, {}",
            self.full_name, self.address, self.city, self.postal_code, self.country
        )
    }
}

/// Discount mechanics of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    Percentage,
    FixedAmount,
    FreeShipping,
    Cashback,
}

/// An active coupon code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: f64,
    #[serde(default)]
    pub min_cart_value: f64,
    #[serde(default)]
    pub max_uses: u32,
    #[serde(default)]
    pub times_used: u32,
}

impl Coupon {
    pub fn remaining_uses(&self) -> u32 {
        self.max_uses.saturating_sub(self.times_used)
    }

    /// Short discount description for coupon menus.
    pub fn discount_label(&self) -> String {
        match self.kind {
            CouponKind::Percentage => format!("{}% off", self.value),
            CouponKind::FixedAmount => format!("${} off", self.value),
            CouponKind::FreeShipping => "Free Shipping".to_string(),
            CouponKind::Cashback => format!("${} cashback", self.value),
        }
    }
}

/// Result of validating a coupon against a cart total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub new_total: f64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Delayed,
}

impl OrderStatus {
    /// Whether the order can still be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Confirmed)
    }

    pub fn status_icon(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "⏳",
            OrderStatus::Confirmed => "✅",
            OrderStatus::Shipped => "🚚",
            OrderStatus::Delivered => "📬",
            OrderStatus::Cancelled => "❌",
            OrderStatus::Delayed => "⚠️",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Delayed => "Delayed",
        };
        write!(f, "{s}")
    }
}

/// A line item within a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Request to create an order from the current cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub order_notes: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl OrderRequest {
    /// Cash-on-delivery order placed through the assistant.
    pub fn assistant_order(shipping_address: ShippingAddress, coupon_code: Option<String>) -> Self {
        Self {
            shipping_address,
            payment_method: "cash_on_delivery".to_string(),
            order_notes: "Order placed via AI assistant".to_string(),
            coupon_code,
        }
    }
}

/// Confirmation returned after an order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub total_amount: f64,
}

/// Component categories a custom PC build is assembled from, in the
/// order the builder flow visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Ram,
    Ssd,
    Cpu,
    Gpu,
    Psu,
    Motherboard,
    #[serde(rename = "aircooler")]
    AirCooler,
    Case,
}

impl ComponentCategory {
    /// Builder visiting order.
    pub const ORDER: [ComponentCategory; 8] = [
        ComponentCategory::Ram,
        ComponentCategory::Ssd,
        ComponentCategory::Cpu,
        ComponentCategory::Gpu,
        ComponentCategory::Psu,
        ComponentCategory::Motherboard,
        ComponentCategory::AirCooler,
        ComponentCategory::Case,
    ];

    /// The category visited after this one, if any.
    pub fn next(self) -> Option<ComponentCategory> {
        let pos = Self::ORDER.iter().position(|c| *c == self)?;
        Self::ORDER.get(pos + 1).copied()
    }

    /// 1-based position in the builder sequence.
    pub fn step_number(self) -> usize {
        Self::ORDER.iter().position(|c| *c == self).unwrap_or(0) + 1
    }

    /// Catalog category name used by product queries.
    pub fn catalog_name(self) -> &'static str {
        match self {
            ComponentCategory::Ram => "RAM",
            ComponentCategory::Ssd => "SSD",
            ComponentCategory::Cpu => "CPU",
            ComponentCategory::Gpu => "GPU",
            ComponentCategory::Psu => "PSU",
            ComponentCategory::Motherboard => "Motherboard",
            ComponentCategory::AirCooler => "AirCooler",
            ComponentCategory::Case => "Case",
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            ComponentCategory::AirCooler => "Air Cooler",
            other => other.catalog_name(),
        }
    }

    /// Lowercase key used in persisted flow state and build documents.
    pub fn key(self) -> &'static str {
        match self {
            ComponentCategory::Ram => "ram",
            ComponentCategory::Ssd => "ssd",
            ComponentCategory::Cpu => "cpu",
            ComponentCategory::Gpu => "gpu",
            ComponentCategory::Psu => "psu",
            ComponentCategory::Motherboard => "motherboard",
            ComponentCategory::AirCooler => "aircooler",
            ComponentCategory::Case => "case",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.iter().copied().find(|c| c.key() == key)
    }
}

/// A component chosen into a build, with a price snapshot taken at
/// selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildComponent {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
}

/// Lifecycle status of a custom PC build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    InProgress,
    Completed,
    Cancelled,
}

/// A custom PC build record owned by the capability provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcBuild {
    pub id: BuildId,
    pub components: HashMap<ComponentCategory, BuildComponent>,
    pub total_price: f64,
    pub status: BuildStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_summary_computes_totals() {
        let summary = CartSummary::from_items(vec![
            CartItem {
                id: CartItemId::new("c1"),
                product_id: ProductId::new("p1"),
                product_name: "Keyboard".to_string(),
                unit_price: 49.5,
                quantity: 2,
            },
            CartItem {
                id: CartItemId::new("c2"),
                product_id: ProductId::new("p2"),
                product_name: "Mouse".to_string(),
                unit_price: 25.0,
                quantity: 1,
            },
        ]);

        assert_eq!(summary.total_items, 3);
        assert!((summary.total_price - 124.0).abs() < f64::EPSILON);
        assert!(!summary.is_empty());
    }

    #[test]
    fn empty_cart_is_empty() {
        assert!(CartSummary::from_items(vec![]).is_empty());
    }

    #[test]
    fn menu_blurb_truncates_long_descriptions() {
        let product = Product {
            id: ProductId::new("p"),
            name: "RAM".to_string(),
            description: Some("x".repeat(120)),
            category: None,
            price: 10.0,
            stock: None,
            rating: None,
        };
        let blurb = product.menu_blurb().unwrap();
        assert_eq!(blurb.chars().count(), 83);
        assert!(blurb.ends_with("..."));
    }

    #[test]
    fn coupon_labels_match_kind() {
        let percent = Coupon {
            code: "SAVE10".to_string(),
            kind: CouponKind::Percentage,
            value: 10.0,
            min_cart_value: 0.0,
            max_uses: 100,
            times_used: 40,
        };
        assert_eq!(percent.discount_label(), "10% off");
        assert_eq!(percent.remaining_uses(), 60);

        let fixed = Coupon {
            kind: CouponKind::FixedAmount,
            value: 5.0,
            ..percent.clone()
        };
        assert_eq!(fixed.discount_label(), "$5 off");
    }

    #[test]
    fn category_order_walks_to_case() {
        let mut current = Some(ComponentCategory::Ram);
        let mut visited = Vec::new();
        while let Some(cat) = current {
            visited.push(cat);
            current = cat.next();
        }
        assert_eq!(visited.len(), 8);
        assert_eq!(visited.last(), Some(&ComponentCategory::Case));
        assert_eq!(ComponentCategory::Case.next(), None);
    }

    #[test]
    fn category_keys_round_trip() {
        for cat in ComponentCategory::ORDER {
            assert_eq!(ComponentCategory::from_key(cat.key()), Some(cat));
        }
        assert_eq!(ComponentCategory::from_key("floppy"), None);
    }

    #[test]
    fn category_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&ComponentCategory::AirCooler).unwrap();
        assert_eq!(json, "\"aircooler\"");
    }

    #[test]
    fn order_status_cancellable_only_early() {
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
    }

    #[test]
    fn assistant_order_defaults_to_cash_on_delivery() {
        let address = ShippingAddress {
            full_name: "Ada".to_string(),
            address: "1 Main St".to_string(),
            city: "Lahore".to_string(),
            postal_code: "54000".to_string(),
            country: "Pakistan".to_string(),
        };
        let request = OrderRequest::assistant_order(address, Some("SAVE10".to_string()));
        assert_eq!(request.payment_method, "cash_on_delivery");
        assert_eq!(request.coupon_code.as_deref(), Some("SAVE10"));
    }
}
