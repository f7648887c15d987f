//! In-memory commerce provider.
//!
//! Fixture-backed implementation of the CommerceService port for tests
//! and local development. State lives behind one mutex; ids are minted
//! sequentially. An `unavailable` switch turns every call into a backend
//! failure for resilience tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::commerce::{
    BuildStatus, BuildComponent, CartItem, CartSummary, ComponentCategory, Coupon, CouponKind,
    CouponValidation, Order, OrderConfirmation, OrderItem, OrderRequest, OrderStatus, PcBuild,
    PriceRange, Product, ProductQuery, ProductSort, ShippingAddress,
};
use crate::domain::foundation::{
    BuildId, CartItemId, OrderId, ProductId, SessionId, Timestamp, UserId,
};
use crate::ports::{CommerceError, CommerceService};

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    carts: HashMap<UserId, Vec<CartItem>>,
    addresses: HashMap<UserId, Vec<ShippingAddress>>,
    coupons: Vec<Coupon>,
    orders: Vec<(UserId, Order)>,
    builds: HashMap<BuildId, (Option<UserId>, PcBuild)>,
    next_cart_item: u32,
    next_order: u32,
    next_build: u32,
}

/// In-memory implementation of [`CommerceService`].
#[derive(Debug, Default)]
pub struct InMemoryCommerce {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl InMemoryCommerce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds catalog products.
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state.lock().unwrap().products = products;
        self
    }

    /// Seeds a cart line for a user; the product must already be seeded.
    pub fn with_cart_item(self, user: &UserId, product_id: &ProductId, quantity: u32) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let product = state
                .products
                .iter()
                .find(|p| &p.id == product_id)
                .expect("seeded cart item references unknown product")
                .clone();
            state.next_cart_item += 1;
            let item = CartItem {
                id: CartItemId::new(format!("ci-{}", state.next_cart_item)),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity,
            };
            state.carts.entry(user.clone()).or_default().push(item);
        }
        self
    }

    /// Seeds shipping addresses for a user.
    pub fn with_addresses(self, user: &UserId, addresses: Vec<ShippingAddress>) -> Self {
        self.state
            .lock()
            .unwrap()
            .addresses
            .insert(user.clone(), addresses);
        self
    }

    /// Seeds available coupons.
    pub fn with_coupons(self, coupons: Vec<Coupon>) -> Self {
        self.state.lock().unwrap().coupons = coupons;
        self
    }

    /// Seeds a placed order for a user.
    pub fn with_order(self, user: &UserId, order: Order) -> Self {
        self.state
            .lock()
            .unwrap()
            .orders
            .push((user.clone(), order));
        self
    }

    /// Makes every subsequent call fail as backend-unavailable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CommerceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CommerceError::Unavailable("injected outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CommerceService for InMemoryCommerce {
    async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, CommerceError> {
        self.check_available()?;
        let needle = query.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| {
                query.category.as_ref().map_or(true, |c| {
                    p.category
                        .as_ref()
                        .is_some_and(|pc| pc.eq_ignore_ascii_case(c))
                })
            })
            .filter(|p| query.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| query.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect();

        match query.sort {
            Some(ProductSort::PriceAsc) => {
                products.sort_by(|a, b| a.price.total_cmp(&b.price));
            }
            Some(ProductSort::PriceDesc) => {
                products.sort_by(|a, b| b.price.total_cmp(&a.price));
            }
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
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.products.iter().find(|p| &p.id == id).cloned())
    }

    async fn product_categories(&self) -> Result<Vec<String>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut categories: Vec<String> = state
            .products
            .iter()
            .filter_map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn price_range(&self) -> Result<PriceRange, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let min = state
            .products
            .iter()
            .map(|p| p.price)
            .fold(f64::INFINITY, f64::min);
        let max = state.products.iter().map(|p| p.price).fold(0.0, f64::max);
        if state.products.is_empty() {
            return Ok(PriceRange { min: 0.0, max: 0.0 });
        }
        Ok(PriceRange { min, max })
    }

    async fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .filter(|p| p.stock.is_some_and(|s| s <= threshold))
            .cloned()
            .collect())
    }

    async fn cart_summary(&self, user: &UserId) -> Result<CartSummary, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let items = state.carts.get(user).cloned().unwrap_or_default();
        Ok(CartSummary::from_items(items))
    }

    async fn cart_items(&self, user: &UserId) -> Result<Vec<CartItem>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.carts.get(user).cloned().unwrap_or_default())
    }

    async fn add_to_cart(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let found = state
            .products
            .iter()
            .find(|p| &p.id == product)
            .cloned()
            .ok_or_else(|| CommerceError::NotFound(format!("product {product}")))?;

        state.next_cart_item += 1;
        let item_id = CartItemId::new(format!("ci-{}", state.next_cart_item));
        let cart = state.carts.entry(user.clone()).or_default();
        if let Some(line) = cart.iter_mut().find(|i| &i.product_id == product) {
            line.quantity += quantity;
        } else {
            cart.push(CartItem {
                id: item_id,
                product_id: found.id.clone(),
                product_name: found.name.clone(),
                unit_price: found.price,
                quantity,
            });
        }
        Ok(())
    }

    async fn remove_cart_item(&self, item: &CartItemId) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        for cart in state.carts.values_mut() {
            if let Some(pos) = cart.iter().position(|i| &i.id == item) {
                cart.remove(pos);
                return Ok(());
            }
        }
        Err(CommerceError::NotFound(format!("cart item {item}")))
    }

    async fn set_cart_quantity(
        &self,
        item: &CartItemId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        for cart in state.carts.values_mut() {
            if let Some(line) = cart.iter_mut().find(|i| &i.id == item) {
                line.quantity = quantity;
                return Ok(());
            }
        }
        Err(CommerceError::NotFound(format!("cart item {item}")))
    }

    async fn increase_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        for cart in state.carts.values_mut() {
            if let Some(line) = cart.iter_mut().find(|i| &i.id == item) {
                line.quantity += 1;
                return Ok(line.quantity);
            }
        }
        Err(CommerceError::NotFound(format!("cart item {item}")))
    }

    async fn decrease_quantity(&self, item: &CartItemId) -> Result<u32, CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        for cart in state.carts.values_mut() {
            if let Some(pos) = cart.iter().position(|i| &i.id == item) {
                if cart[pos].quantity <= 1 {
                    cart.remove(pos);
                    return Ok(0);
                }
                cart[pos].quantity -= 1;
                return Ok(cart[pos].quantity);
            }
        }
        Err(CommerceError::NotFound(format!("cart item {item}")))
    }

    async fn empty_cart(&self, user: &UserId) -> Result<u32, CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let removed = state
            .carts
            .insert(user.clone(), Vec::new())
            .map(|items| items.len() as u32)
            .unwrap_or(0);
        Ok(removed)
    }

    async fn create_order(
        &self,
        user: &UserId,
        request: OrderRequest,
    ) -> Result<OrderConfirmation, CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let items = state.carts.get(user).cloned().unwrap_or_default();
        if items.is_empty() {
            return Err(CommerceError::InvalidRequest(
                "cannot create an order from an empty cart".to_string(),
            ));
        }

        let subtotal: f64 = items.iter().map(|i| i.line_total()).sum();
        let discount = request
            .coupon_code
            .as_ref()
            .and_then(|code| {
                state
                    .coupons
                    .iter()
                    .find(|c| c.code.eq_ignore_ascii_case(code))
            })
            .filter(|c| c.remaining_uses() > 0 && subtotal >= c.min_cart_value)
            .map(|c| match c.kind {
                CouponKind::Percentage => subtotal * c.value / 100.0,
                CouponKind::FixedAmount => c.value.min(subtotal),
                CouponKind::FreeShipping | CouponKind::Cashback => 0.0,
            })
            .unwrap_or(0.0);
        let total = subtotal - discount;

        state.next_order += 1;
        let order_number = format!("{}", 100_000 + state.next_order);
        let order_id = OrderId::new(format!("order-{}", state.next_order));
        let tracking = format!(
            "TH-{}",
            uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );

        let order = Order {
            id: order_id.clone(),
            order_number: order_number.clone(),
            tracking_number: Some(tracking.clone()),
            status: OrderStatus::Processing,
            total_amount: total,
            items: items
                .iter()
                .map(|i| OrderItem {
                    name: i.product_name.clone(),
                    quantity: i.quantity,
                    price: i.unit_price,
                })
                .collect(),
            created_at: Some(Timestamp::now()),
        };
        state.orders.push((user.clone(), order));
        state.carts.insert(user.clone(), Vec::new());

        Ok(OrderConfirmation {
            order_id,
            order_number,
            tracking_number: Some(tracking),
            total_amount: total,
        })
    }

    async fn user_orders(&self, user: &UserId) -> Result<Vec<Order>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, order)| order.clone())
            .collect())
    }

    async fn order_details(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|(_, o)| &o.id == id)
            .map(|(_, o)| o.clone()))
    }

    async fn order_by_number(
        &self,
        number: &str,
        user: Option<&UserId>,
    ) -> Result<Option<Order>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .filter(|(owner, _)| user.map_or(true, |u| owner == u))
            .find(|(_, o)| {
                o.order_number.eq_ignore_ascii_case(number)
                    || o.tracking_number
                        .as_ref()
                        .is_some_and(|t| t.eq_ignore_ascii_case(number))
            })
            .map(|(_, o)| o.clone()))
    }

    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|(_, o)| &o.id == id)
            .map(|(_, o)| o)
            .ok_or_else(|| CommerceError::NotFound(format!("order {id}")))?;

        if !order.status.is_cancellable() {
            return Err(CommerceError::InvalidRequest(format!(
                "order in status {} cannot be cancelled",
                order.status
            )));
        }
        order.status = OrderStatus::Cancelled;
        Ok(())
    }

    async fn shipping_addresses(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShippingAddress>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.addresses.get(user).cloned().unwrap_or_default())
    }

    async fn add_shipping_address(
        &self,
        user: &UserId,
        address: ShippingAddress,
    ) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        state
            .addresses
            .entry(user.clone())
            .or_default()
            .push(address);
        Ok(())
    }

    async fn validate_coupon(
        &self,
        code: &str,
        cart_total: f64,
        _user: &UserId,
    ) -> Result<CouponValidation, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let Some(coupon) = state
            .coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
        else {
            return Ok(CouponValidation {
                valid: false,
                discount: 0.0,
                new_total: cart_total,
                message: Some("Invalid coupon code".to_string()),
            });
        };

        if coupon.remaining_uses() == 0 {
            return Ok(CouponValidation {
                valid: false,
                discount: 0.0,
                new_total: cart_total,
                message: Some("This coupon has been fully redeemed".to_string()),
            });
        }
        if cart_total < coupon.min_cart_value {
            return Ok(CouponValidation {
                valid: false,
                discount: 0.0,
                new_total: cart_total,
                message: Some(format!(
                    "Cart total must be at least ${:.2} for this coupon",
                    coupon.min_cart_value
                )),
            });
        }

        let discount = match coupon.kind {
            CouponKind::Percentage => cart_total * coupon.value / 100.0,
            CouponKind::FixedAmount => coupon.value.min(cart_total),
            CouponKind::FreeShipping | CouponKind::Cashback => 0.0,
        };
        Ok(CouponValidation {
            valid: true,
            discount,
            new_total: cart_total - discount,
            message: None,
        })
    }

    async fn available_coupons(&self) -> Result<Vec<Coupon>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .coupons
            .iter()
            .filter(|c| c.remaining_uses() > 0)
            .cloned()
            .collect())
    }

    async fn start_build(
        &self,
        user: Option<&UserId>,
        _session: &SessionId,
    ) -> Result<BuildId, CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        state.next_build += 1;
        let id = BuildId::new(format!("build-{}", state.next_build));
        state.builds.insert(
            id.clone(),
            (
                user.cloned(),
                PcBuild {
                    id: id.clone(),
                    components: HashMap::new(),
                    total_price: 0.0,
                    status: BuildStatus::InProgress,
                },
            ),
        );
        Ok(id)
    }

    async fn build(&self, id: &BuildId) -> Result<Option<PcBuild>, CommerceError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.builds.get(id).map(|(_, build)| build.clone()))
    }

    async fn add_build_component(
        &self,
        id: &BuildId,
        category: ComponentCategory,
        product: &ProductId,
    ) -> Result<(), CommerceError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let found = state
            .products
            .iter()
            .find(|p| &p.id == product)
            .cloned()
            .ok_or_else(|| CommerceError::NotFound(format!("product {product}")))?;

        let (_, build) = state
            .builds
            .get_mut(id)
            .ok_or_else(|| CommerceError::NotFound(format!("build {id}")))?;

        build.components.insert(
            category,
            BuildComponent {
                product_id: found.id.clone(),
                name: found.name.clone(),
                price: found.price,
            },
        );
        build.total_price = build.components.values().map(|c| c.price).sum();
        Ok(())
    }

    async fn save_build_to_cart(&self, id: &BuildId) -> Result<u32, CommerceError> {
        self.check_available()?;
        let (owner, components) = {
            let mut state = self.state.lock().unwrap();
            let (owner, build) = state
                .builds
                .get_mut(id)
                .ok_or_else(|| CommerceError::NotFound(format!("build {id}")))?;
            build.status = BuildStatus::Completed;
            (owner.clone(), build.components.clone())
        };

        let Some(owner) = owner else {
            return Err(CommerceError::InvalidRequest(
                "build has no owner; login required to save to cart".to_string(),
            ));
        };

        let mut count = 0;
        for component in components.values() {
            self.add_to_cart(&owner, &component.product_id, 1).await?;
            count += 1;
        }
        Ok(count)
    }
}
