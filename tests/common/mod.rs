//! Shared harness for whole-turn integration tests: the orchestrator
//! wired to in-memory adapters and a scripted AI provider.
#![allow(dead_code)] // each test binary uses a different subset

use std::sync::Arc;
use std::time::Duration;

use shop_concierge::adapters::ai::MockAiProvider;
use shop_concierge::adapters::commerce::InMemoryCommerce;
use shop_concierge::adapters::knowledge::InMemoryKnowledgeBase;
use shop_concierge::adapters::storage::InMemoryConversationStore;
use shop_concierge::application::{ReasoningEngine, ResponseCache, SessionOrchestrator};
use shop_concierge::domain::approval::ApprovalGate;
use shop_concierge::domain::checkout::CheckoutFlow;
use shop_concierge::domain::commerce::{Coupon, CouponKind, Product, ShippingAddress};
use shop_concierge::domain::conversation::tools::{default_catalog, ToolExecutor};
use shop_concierge::domain::foundation::{ProductId, UserId};
use shop_concierge::domain::pc_builder::PcBuilderFlow;

pub struct Harness {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub commerce: Arc<InMemoryCommerce>,
    pub store: Arc<InMemoryConversationStore>,
    pub ai: MockAiProvider,
}

/// Builds the orchestrator over the given commerce fixture and scripted
/// AI provider, with a short engine timeout suitable for tests.
pub fn harness(commerce: InMemoryCommerce, ai: MockAiProvider) -> Harness {
    harness_with_timeout(commerce, ai, Duration::from_secs(5))
}

pub fn harness_with_timeout(
    commerce: InMemoryCommerce,
    ai: MockAiProvider,
    timeout: Duration,
) -> Harness {
    let commerce = Arc::new(commerce);
    let store = Arc::new(InMemoryConversationStore::new());
    let knowledge = Arc::new(InMemoryKnowledgeBase::new().with_store_policies());
    let ai_arc: Arc<MockAiProvider> = Arc::new(ai.clone());

    let executor = ToolExecutor::new(commerce.clone(), knowledge);
    let reasoning = ReasoningEngine::new(
        ai_arc.clone(),
        default_catalog(),
        executor,
        ResponseCache::standard(),
        timeout,
    );

    let orchestrator = Arc::new(SessionOrchestrator::new(
        store.clone(),
        reasoning,
        CheckoutFlow::new(commerce.clone()),
        PcBuilderFlow::new(commerce.clone(), ai_arc),
        Arc::new(ApprovalGate::new()),
    ));

    Harness {
        orchestrator,
        commerce,
        store,
        ai,
    }
}

pub fn user() -> UserId {
    UserId::new("customer-1")
}

pub fn product(id: &str, name: &str, category: &str, price: f64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: Some(format!("{name} with solid specs")),
        category: Some(category.to_string()),
        price,
        stock: Some(10),
        rating: Some(4.2),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ada Lovelace".to_string(),
        address: "1 Analytical Way".to_string(),
        city: "Lahore".to_string(),
        postal_code: "54000".to_string(),
        country: "Pakistan".to_string(),
    }
}

pub fn coupon(code: &str, percent: f64) -> Coupon {
    Coupon {
        code: code.to_string(),
        kind: CouponKind::Percentage,
        value: percent,
        min_cart_value: 0.0,
        max_uses: 100,
        times_used: 0,
    }
}

/// A catalog with every PC component category populated plus two
/// peripherals.
pub fn full_catalog() -> Vec<Product> {
    vec![
        product("ram-1", "DDR5 32GB Kit", "RAM", 129.0),
        product("ram-2", "DDR4 16GB Kit", "RAM", 59.0),
        product("ssd-1", "NVMe SSD 1TB", "SSD", 89.0),
        product("cpu-1", "8-Core CPU", "CPU", 299.0),
        product("gpu-1", "RTX Graphics Card", "GPU", 599.0),
        product("psu-1", "750W PSU", "PSU", 99.0),
        product("mb-1", "ATX Motherboard", "Motherboard", 179.0),
        product("cool-1", "Tower Air Cooler", "AirCooler", 49.0),
        product("case-1", "Mid Tower Case", "Case", 79.0),
        product("kb-1", "Mechanical Keyboard", "Peripherals", 80.0),
        product("ms-1", "Wireless Mouse", "Peripherals", 40.0),
    ]
}
