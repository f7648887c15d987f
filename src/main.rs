//! Shop Concierge server binary.
//!
//! Wires the adapters to the orchestration core and serves the chat API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shop_concierge::adapters::ai::{OpenAiConfig, OpenAiProvider};
use shop_concierge::adapters::commerce::{HttpCommerceClient, HttpCommerceConfig};
use shop_concierge::adapters::http::chat::{chat_router, ChatAppState};
use shop_concierge::adapters::knowledge::InMemoryKnowledgeBase;
use shop_concierge::adapters::postgres::PostgresConversationStore;
use shop_concierge::application::{ReasoningEngine, ResponseCache, SessionOrchestrator};
use shop_concierge::config::AppConfig;
use shop_concierge::domain::approval::ApprovalGate;
use shop_concierge::domain::checkout::CheckoutFlow;
use shop_concierge::domain::conversation::tools::{default_catalog, ToolExecutor};
use shop_concierge::domain::pc_builder::PcBuilderFlow;
use shop_concierge::ports::{AiProvider, CommerceService, ConversationStore, KnowledgeRetriever};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    // Persistence
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    let store = PostgresConversationStore::new(pool);
    store.ensure_schema().await?;
    let store: Arc<dyn ConversationStore> = Arc::new(store);

    // Capability providers
    let commerce: Arc<dyn CommerceService> = Arc::new(HttpCommerceClient::new(
        HttpCommerceConfig::new(&config.commerce.base_url)
            .with_timeout(config.commerce.timeout()),
    ));
    let knowledge: Arc<dyn KnowledgeRetriever> =
        Arc::new(InMemoryKnowledgeBase::new().with_store_policies());

    // Reasoning engine
    let ai: Arc<dyn AiProvider> = Arc::new(OpenAiProvider::new(
        OpenAiConfig::new(&config.ai.openai_api_key)
            .with_model(&config.ai.model)
            .with_timeout(config.ai.timeout()),
    ));

    let registry = default_catalog();
    let executor = ToolExecutor::new(commerce.clone(), knowledge);
    let reasoning = ReasoningEngine::new(
        ai.clone(),
        registry,
        executor,
        ResponseCache::standard(),
        config.ai.timeout(),
    );

    // Flows and gate
    let checkout = CheckoutFlow::new(commerce.clone());
    let pc_builder = PcBuilderFlow::new(commerce, ai);
    let gate = Arc::new(ApprovalGate::new());

    let orchestrator = Arc::new(SessionOrchestrator::new(
        store, reasoning, checkout, pc_builder, gate,
    ));

    let app = chat_router()
        .with_state(ChatAppState { orchestrator })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "shop-concierge listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
