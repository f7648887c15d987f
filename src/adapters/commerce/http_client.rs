//! REST client against the storefront backend.
//!
//! Maps each port operation to one backend endpoint (mounted under
//! /product, /cart, /shipping, /order, /coupon and /custom-pc) and
//! converts the document-store response shapes into domain types.
//! Catalog aggregates the backend does not expose (categories, price
//! range, low stock) are computed from the product listing.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::commerce::{
    BuildStatus, BuildComponent, CartItem, CartSummary, ComponentCategory, Coupon, CouponKind,
    CouponValidation, Order, OrderConfirmation, OrderItem, OrderRequest, OrderStatus, PcBuild,
    PriceRange, Product, ProductQuery, ProductSort, ShippingAddress,
};
use crate::domain::foundation::{
    BuildId, CartItemId, OrderId, ProductId, SessionId, Timestamp, UserId,
};
use crate::ports::{CommerceError, CommerceService};

/// Configuration for the storefront client.
#[derive(Debug, Clone)]
pub struct HttpCommerceConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpCommerceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of [`CommerceService`].
pub struct HttpCommerceClient {
    config: HttpCommerceConfig,
    client: Client,
}

impl HttpCommerceClient {
    pub fn new(config: HttpCommerceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, CommerceError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, CommerceError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn all_products(&self) -> Result<Vec<Product>, CommerceError> {
        let docs: Vec<ProductDoc> = self.get_json("/product/getAllProducts").await?;
        Ok(docs.into_iter().map(ProductDoc::into_product).collect())
    }
}

#[async_trait]
impl CommerceService for HttpCommerceClient {
    async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, CommerceError> {
        let needle = query.to_lowercase();
        let mut products = self.all_products().await?;
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description
                    .as_ref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        });
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError> {
        let mut products = self.all_products().await?;
        products.retain(|p| {
            query.category.as_ref().map_or(true, |c| {
                p.category
                    .as_ref()
                    .is_some_and(|pc| pc.eq_ignore_ascii_case(c))
            }) && query.min_price.map_or(true, |min| p.price >= min)
                && query.max_price.map_or(true, |max| p.price <= max)
        });
        match query.sort {
            Some(ProductSort::PriceAsc) => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some(ProductSort::PriceDesc) => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
            Some(ProductSort::NameAsc) => products.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(ProductSort::RatingDesc) => products.sort_by(|a, b| {
                b.rating
                    .unwrap_or(0.0)
                    .total_cmp(&a.rating.unwrap_or(0.0))
            }),
            None => {}
        }
        products.truncate(query.limit as usize);
        Ok(products)
    }

    async fn product_details(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
        match self
            .get_json::<ProductDoc>(&format!("/product/getProductDetails/{id}"))
            .await
        {
            Ok(doc) => Ok(Some(doc.into_product())),
            Err(CommerceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn product_categories(&self) -> Result<Vec<String>, CommerceError> {
        let mut categories: Vec<String> = self
            .all_products()
            .await?
            .into_iter()
            .filter_map(|p| p.category)
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn price_range(&self) -> Result<PriceRange, CommerceError> {
        let products = self.all_products().await?;
        if products.is_empty() {
            return Ok(PriceRange { min: 0.0, max: 0.0 });
        }
        let min = products.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max = products.iter().map(|p| p.price).fold(0.0, f64::max);
        Ok(PriceRange { min, max })
    }

    async fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>, CommerceError> {
        let mut products = self.all_products().await?;
        products.retain(|p| p.stock.is_some_and(|s| s <= threshold));
        Ok(products)
    }

    async fn cart_summary(&self, user: &UserId) -> Result<CartSummary, CommerceError> {
        let items = self.cart_items(user).await?;
        Ok(CartSummary::from_items(items))
    }

    async fn cart_items(&self, user: &UserId) -> Result<Vec<CartItem>, CommerceError> {
        let docs: Vec<CartItemDoc> = self.get_json(&format!("/cart/getCart/{user}")).await?;
        Ok(docs.into_iter().map(CartItemDoc::into_item).collect())
    }

    async fn add_to_cart(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json(
                "/cart/addToCart",
                &json!({ "uid": user, "pid": product, "quantity": quantity }),
            )
            .await?;
        Ok(())
    }

    async fn remove_cart_item(&self, item: &CartItemId) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json("/cart/removeItem", &json!({ "cartItemId": item }))
            .await?;
        Ok(())
    }

    async fn set_cart_quantity(
        &self,
        item: &CartItemId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json(
                "/cart/updateQuantity",
                &json!({ "cartItemId": item, "quantity": quantity }),
            )
            .await?;
        Ok(())
    }

    async fn increase_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError> {
        let ack: QuantityAck = self
            .post_json("/cart/increaseQuantity", &json!({ "cartItemId": item }))
            .await?;
        Ok(ack.quantity)
    }

    async fn decrease_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError> {
        let ack: QuantityAck = self
            .post_json("/cart/decreaseQuantity", &json!({ "cartItemId": item }))
            .await?;
        Ok(ack.quantity)
    }

    async fn empty_cart(&self, user: &UserId) -> Result<u32, CommerceError> {
        let response = self
            .client
            .delete(self.url(&format!("/cart/clearCart/{user}")))
            .send()
            .await
            .map_err(transport_error)?;
        let ack: RemovedAck = decode(response).await?;
        Ok(ack.removed)
    }

    async fn create_order(
        &self,
        user: &UserId,
        request: OrderRequest,
    ) -> Result<OrderConfirmation, CommerceError> {
        let doc: OrderCreatedDoc = self
            .post_json(
                "/order/createOrder",
                &json!({
                    "uid": user,
                    "shippingAddress": {
                        "fullName": request.shipping_address.full_name,
                        "address": request.shipping_address.address,
                        "city": request.shipping_address.city,
                        "postalCode": request.shipping_address.postal_code,
                        "country": request.shipping_address.country,
                    },
                    "paymentMethod": request.payment_method,
                    "orderNotes": request.order_notes,
                    "couponCode": request.coupon_code,
                }),
            )
            .await?;

        Ok(OrderConfirmation {
            order_id: OrderId::new(doc.id),
            order_number: doc.order_number,
            tracking_number: doc.tracking_number,
            total_amount: doc.total_amount,
        })
    }

    async fn user_orders(&self, user: &UserId) -> Result<Vec<Order>, CommerceError> {
        let docs: Vec<OrderDoc> = self.get_json(&format!("/order/userOrders/{user}")).await?;
        Ok(docs.into_iter().map(OrderDoc::into_order).collect())
    }

    async fn order_details(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        match self
            .get_json::<OrderDoc>(&format!("/order/orderSummary/{id}"))
            .await
        {
            Ok(doc) => Ok(Some(doc.into_order())),
            Err(CommerceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn order_by_number(
        &self,
        number: &str,
        user: Option<&UserId>,
    ) -> Result<Option<Order>, CommerceError> {
        let path = match user {
            Some(user) => format!("/order/trackOrder/{number}?uid={user}"),
            None => format!("/order/trackOrder/{number}"),
        };
        match self.get_json::<OrderDoc>(&path).await {
            Ok(doc) => Ok(Some(doc.into_order())),
            Err(CommerceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json(
                "/order/updateOrderStatus",
                &json!({ "orderId": id, "status": "Cancel" }),
            )
            .await?;
        Ok(())
    }

    async fn shipping_addresses(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShippingAddress>, CommerceError> {
        let docs: Vec<AddressDoc> = self
            .get_json(&format!("/shipping/getAllShipping/{user}"))
            .await?;
        Ok(docs.into_iter().map(AddressDoc::into_address).collect())
    }

    async fn add_shipping_address(
        &self,
        user: &UserId,
        address: ShippingAddress,
    ) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json(
                "/shipping/addShipping",
                &json!({
                    "uid": user,
                    "fullName": address.full_name,
                    "address": address.address,
                    "city": address.city,
                    "postalCode": address.postal_code,
                    "country": address.country,
                }),
            )
            .await?;
        Ok(())
    }

    async fn validate_coupon(
        &self,
        code: &str,
        cart_total: f64,
        user: &UserId,
    ) -> Result<CouponValidation, CommerceError> {
        let doc: CouponValidationDoc = self
            .post_json(
                "/coupon/validate",
                &json!({ "code": code, "cartTotal": cart_total, "uid": user }),
            )
            .await?;
        Ok(CouponValidation {
            valid: doc.valid,
            discount: doc.discount,
            new_total: doc.new_total.unwrap_or(cart_total - doc.discount),
            message: doc.message,
        })
    }

    async fn available_coupons(&self) -> Result<Vec<Coupon>, CommerceError> {
        let docs: Vec<CouponDoc> = self.get_json("/coupon/available").await?;
        Ok(docs.into_iter().map(CouponDoc::into_coupon).collect())
    }

    async fn start_build(
        &self,
        user: Option<&UserId>,
        session: &SessionId,
    ) -> Result<BuildId, CommerceError> {
        let doc: BuildStartedDoc = self
            .post_json(
                "/custom-pc/start",
                &json!({ "userId": user, "sessionId": session }),
            )
            .await?;
        Ok(BuildId::new(doc.build_id))
    }

    async fn build(&self, id: &BuildId) -> Result<Option<PcBuild>, CommerceError> {
        match self.get_json::<BuildDoc>(&format!("/custom-pc/build/{id}")).await {
            Ok(doc) => Ok(Some(doc.into_build())),
            Err(CommerceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_build_component(
        &self,
        id: &BuildId,
        category: ComponentCategory,
        product: &ProductId,
    ) -> Result<(), CommerceError> {
        let _: Ack = self
            .post_json(
                "/custom-pc/add-component",
                &json!({
                    "buildId": id,
                    "componentType": category.key(),
                    "productId": product,
                }),
            )
            .await?;
        Ok(())
    }

    async fn save_build_to_cart(&self, id: &BuildId) -> Result<u32, CommerceError> {
        let ack: AddedAck = self
            .post_json(&format!("/custom-pc/save-to-cart/{id}"), &json!({}))
            .await?;
        Ok(ack.added)
    }
}

fn transport_error(e: reqwest::Error) -> CommerceError {
    CommerceError::Unavailable(e.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CommerceError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(CommerceError::NotFound("resource not found".to_string()));
    }
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(CommerceError::InvalidRequest(body));
    }
    if !status.is_success() {
        return Err(CommerceError::Unavailable(format!("status {status}")));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| CommerceError::Unavailable(format!("bad response body: {e}")))
}

// --- backend document shapes ---

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    #[allow(dead_code)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct QuantityAck {
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct RemovedAck {
    #[serde(default)]
    removed: u32,
}

#[derive(Debug, Deserialize)]
struct AddedAck {
    #[serde(default)]
    added: u32,
}

#[derive(Debug, Deserialize)]
struct ProductDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    price: f64,
    #[serde(default, rename = "countInStock")]
    count_in_stock: Option<i64>,
    #[serde(default)]
    rating: Option<f32>,
}

impl ProductDoc {
    fn into_product(self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            stock: self.count_in_stock,
            rating: self.rating,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CartItemDoc {
    #[serde(rename = "_id")]
    id: String,
    product: CartProductDoc,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct CartProductDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    price: f64,
}

impl CartItemDoc {
    fn into_item(self) -> CartItem {
        CartItem {
            id: CartItemId::new(self.id),
            product_id: ProductId::new(self.product.id),
            product_name: self.product.name,
            unit_price: self.product.price,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddressDoc {
    #[serde(rename = "fullName")]
    full_name: String,
    address: String,
    city: String,
    #[serde(rename = "postalCode")]
    postal_code: String,
    #[serde(default)]
    country: String,
}

impl AddressDoc {
    fn into_address(self) -> ShippingAddress {
        ShippingAddress {
            full_name: self.full_name,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CouponDoc {
    code: String,
    #[serde(rename = "type")]
    kind: String,
    value: f64,
    #[serde(default, rename = "minCartValue")]
    min_cart_value: f64,
    #[serde(default, rename = "maxUses")]
    max_uses: u32,
    #[serde(default, rename = "timesUsed")]
    times_used: u32,
}

impl CouponDoc {
    fn into_coupon(self) -> Coupon {
        let kind = match self.kind.as_str() {
            "FIXED_AMOUNT" => CouponKind::FixedAmount,
            "FREE_SHIPPING" => CouponKind::FreeShipping,
            "CASHBACK" => CouponKind::Cashback,
            _ => CouponKind::Percentage,
        };
        Coupon {
            code: self.code,
            kind,
            value: self.value,
            min_cart_value: self.min_cart_value,
            max_uses: self.max_uses,
            times_used: self.times_used,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CouponValidationDoc {
    valid: bool,
    #[serde(default)]
    discount: f64,
    #[serde(default, rename = "newTotal")]
    new_total: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderCreatedDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "orderNumber")]
    order_number: String,
    #[serde(default, rename = "trackingNumber")]
    tracking_number: Option<String>,
    #[serde(rename = "totalAmount")]
    total_amount: f64,
}

#[derive(Debug, Deserialize)]
struct OrderDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "orderNumber")]
    order_number: String,
    #[serde(default, rename = "trackingNumber")]
    tracking_number: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(rename = "totalAmount")]
    total_amount: f64,
    #[serde(default, rename = "orderItems")]
    order_items: Vec<OrderItemDoc>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct OrderItemDoc {
    name: String,
    quantity: u32,
    price: f64,
}

impl OrderDoc {
    fn into_order(self) -> Order {
        let status = match self.status.as_str() {
            "Confirmed" => OrderStatus::Confirmed,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            "Cancel" | "Cancelled" => OrderStatus::Cancelled,
            "Delayed" => OrderStatus::Delayed,
            _ => OrderStatus::Processing,
        };
        Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            tracking_number: self.tracking_number,
            status,
            total_amount: self.total_amount,
            items: self
                .order_items
                .into_iter()
                .map(|i| OrderItem {
                    name: i.name,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
            created_at: self.created_at.map(Timestamp::from_datetime),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BuildStartedDoc {
    #[serde(rename = "buildId")]
    build_id: String,
}

#[derive(Debug, Deserialize)]
struct BuildDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    components: HashMap<String, BuildComponentDoc>,
    #[serde(default, rename = "totalPrice")]
    total_price: f64,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct BuildComponentDoc {
    #[serde(rename = "productId")]
    product_id: String,
    name: String,
    price: f64,
}

impl BuildDoc {
    fn into_build(self) -> PcBuild {
        let status = match self.status.as_str() {
            "completed" => BuildStatus::Completed,
            "cancelled" => BuildStatus::Cancelled,
            _ => BuildStatus::InProgress,
        };
        let components = self
            .components
            .into_iter()
            .filter_map(|(key, doc)| {
                ComponentCategory::from_key(&key).map(|category| {
                    (
                        category,
                        BuildComponent {
                            product_id: ProductId::new(doc.product_id),
                            name: doc.name,
                            price: doc.price,
                        },
                    )
                })
            })
            .collect();
        PcBuild {
            id: BuildId::new(self.id),
            components,
            total_price: self.total_price,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_doc_maps_backend_field_names() {
        let doc: ProductDoc = serde_json::from_value(json!({
            "_id": "64ab",
            "name": "DDR5 Kit",
            "category": "RAM",
            "price": 129.5,
            "countInStock": 7,
            "rating": 4.5,
        }))
        .unwrap();
        let product = doc.into_product();
        assert_eq!(product.id.as_str(), "64ab");
        assert_eq!(product.stock, Some(7));
    }

    #[test]
    fn order_doc_maps_status_strings() {
        let doc: OrderDoc = serde_json::from_value(json!({
            "_id": "o1",
            "orderNumber": "100245",
            "trackingNumber": "TH-AB12CD34",
            "status": "Cancel",
            "totalAmount": 50.0,
            "orderItems": [{"name": "Mouse", "quantity": 1, "price": 50.0}],
        }))
        .unwrap();
        let order = doc.into_order();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn build_doc_drops_unknown_component_keys() {
        let doc: BuildDoc = serde_json::from_value(json!({
            "_id": "b1",
            "components": {
                "ram": {"productId": "p1", "name": "DDR5", "price": 129.0},
                "flux_capacitor": {"productId": "p9", "name": "??", "price": 1.0},
            },
            "totalPrice": 130.0,
            "status": "in_progress",
        }))
        .unwrap();
        let build = doc.into_build();
        assert_eq!(build.components.len(), 1);
        assert!(build.components.contains_key(&ComponentCategory::Ram));
    }

    #[test]
    fn config_strips_trailing_slash() {
        let config = HttpCommerceConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
    }
}
