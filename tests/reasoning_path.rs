//! Whole-turn integration tests for the general reasoning path: fast
//! paths, response cache, tool loop, hallucination guard and the
//! approval gate.

mod common;

use common::{address, full_catalog, harness, harness_with_timeout, user};
use serde_json::json;
use shop_concierge::adapters::ai::{MockAiProvider, MockReply};
use shop_concierge::adapters::commerce::InMemoryCommerce;
use shop_concierge::domain::commerce::OrderRequest;
use shop_concierge::domain::conversation::tools::ToolCall;
use shop_concierge::domain::foundation::{ProductId, SessionId};
use shop_concierge::ports::{CommerceService, MessageRole};
use std::time::Duration;

fn session() -> SessionId {
    SessionId::new("general-session")
}

fn seeded_commerce() -> InMemoryCommerce {
    InMemoryCommerce::new()
        .with_products(full_catalog())
        .with_cart_item(&user(), &ProductId::new("kb-1"), 1)
        .with_cart_item(&user(), &ProductId::new("ms-1"), 1)
        .with_addresses(&user(), vec![address()])
}

#[tokio::test]
async fn greetings_never_reach_the_engine() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "hi")
        .await;

    assert_eq!(turn.reply, "Hello! I can help you shop. What are you looking for?");
    assert_eq!(h.ai.call_count(), 0);
}

#[tokio::test]
async fn identical_anonymous_query_is_served_from_cache() {
    let ai = MockAiProvider::new().with_answer("We stock gaming laptops and desktops.");
    let h = harness(seeded_commerce(), ai);

    // Two fresh sessions asking the identical non-transactional question:
    // the second is answered from the shared cache.
    let first = h
        .orchestrator
        .handle_message(&SessionId::new("cache-a"), None, "what laptops do you have?")
        .await;
    let second = h
        .orchestrator
        .handle_message(&SessionId::new("cache-b"), None, "what laptops do you have?")
        .await;

    assert_eq!(first.reply, second.reply);
    // The second turn hit the cache, not the engine.
    assert_eq!(h.ai.call_count(), 1);
}

#[tokio::test]
async fn transactional_queries_bypass_the_cache() {
    let ai = MockAiProvider::new()
        .with_answer("first answer about your order")
        .with_answer("second answer about your order");
    let h = harness(seeded_commerce(), ai);

    h.orchestrator
        .handle_message(&session(), None, "how do I cancel an order?")
        .await;
    h.orchestrator
        .handle_message(&session(), None, "how do I cancel an order?")
        .await;

    assert_eq!(h.ai.call_count(), 2);
}

#[tokio::test]
async fn tracking_number_fast_path_skips_the_engine() {
    let commerce = seeded_commerce();
    // Place an order so a tracking number exists.
    let confirmation = commerce
        .create_order(&user(), OrderRequest::assistant_order(address(), None))
        .await
        .unwrap();
    let tracking = confirmation.tracking_number.unwrap();

    let h = harness(commerce, MockAiProvider::new());
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), &tracking)
        .await;

    assert!(
        turn.reply.contains("Order Tracking Information"),
        "got: {}",
        turn.reply
    );
    assert!(turn.reply.contains(&tracking));
    assert_eq!(h.ai.call_count(), 0);
}

#[tokio::test]
async fn unknown_tracking_number_reports_not_found() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "TH-DOESNOTX")
        .await;

    assert!(turn.reply.contains("Order not found"), "got: {}", turn.reply);
    assert_eq!(h.ai.call_count(), 0);
}

#[tokio::test]
async fn tool_loop_executes_and_feeds_results_back() {
    let call = ToolCall::new("call-1", "get_cart_summary", json!({}));
    let ai = MockAiProvider::new()
        .with_tool_calls(vec![call])
        .with_answer("You have 2 items in your cart.");
    let h = harness(seeded_commerce(), ai);

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "what's in my cart?")
        .await;

    assert_eq!(turn.reply, "You have 2 items in your cart.");
    assert_eq!(h.ai.call_count(), 2);

    // The follow-up request carried the tool result.
    let second_request = &h.ai.recorded_calls()[1];
    let tool_msg = second_request
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool result message missing");
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call-1"));
    assert!(tool_msg.content.contains("total_price"));
}

#[tokio::test]
async fn empty_cart_hallucination_is_overridden_by_tool_output() {
    // The model fetches the (non-empty) cart, then claims it is empty.
    let call = ToolCall::new("call-1", "get_cart_summary", json!({}));
    let ai = MockAiProvider::new()
        .with_tool_calls(vec![call])
        .with_answer("It looks like your cart is empty.");
    let h = harness(seeded_commerce(), ai);

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "what's in my cart?")
        .await;

    // The authoritative tool output wins over the hallucinated claim.
    assert!(
        turn.reply.contains("item(s) totaling"),
        "guard did not fire: {}",
        turn.reply
    );
    assert!(turn.reply.contains("Mechanical Keyboard"));
}

#[tokio::test]
async fn login_required_result_reaches_the_model_structured() {
    let call = ToolCall::new(
        "call-1",
        "add_to_cart",
        json!({"product_id": "kb-1", "quantity": 1}),
    );
    let ai = MockAiProvider::new()
        .with_tool_calls(vec![call])
        .with_answer("Please login to add items to your cart.");
    let h = harness(seeded_commerce(), ai);

    // No user on the session: the tool yields login_required, not a fault.
    let turn = h
        .orchestrator
        .handle_message(&session(), None, "add the keyboard to my cart")
        .await;

    assert_eq!(turn.reply, "Please login to add items to your cart.");
    let second_request = &h.ai.recorded_calls()[1];
    let tool_msg = second_request
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .unwrap();
    assert!(tool_msg.content.contains("login_required"));
}

#[tokio::test]
async fn engine_timeout_degrades_to_an_apology_turn() {
    let ai = MockAiProvider::new()
        .with_answer("too slow anyway")
        .with_delay(Duration::from_millis(250));
    let h = harness_with_timeout(seeded_commerce(), ai, Duration::from_millis(50));

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "tell me about gaming laptops")
        .await;

    assert!(
        turn.reply.contains("taking too long"),
        "got: {}",
        turn.reply
    );

    // The degraded reply is still a persisted assistant turn.
    let history = h.orchestrator.history(&session()).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn engine_failure_suggests_retry_without_retrying() {
    let ai = MockAiProvider::new().with_reply(MockReply::Unavailable("gateway down".to_string()));
    let h = harness(seeded_commerce(), ai);

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "tell me about monitors")
        .await;

    assert!(turn.reply.contains("Please try again"), "got: {}", turn.reply);
    assert_eq!(h.ai.call_count(), 1); // no automatic retry
}

#[tokio::test]
async fn order_creation_marks_the_turn_for_approval() {
    let call = ToolCall::new(
        "call-1",
        "create_order",
        json!({
            "full_name": "Ada Lovelace",
            "address": "1 Analytical Way",
            "city": "Lahore",
            "postal_code": "54000",
        }),
    );
    let ai = MockAiProvider::new()
        .with_tool_calls(vec![call])
        .with_answer("Your order has been placed.");
    let h = harness(seeded_commerce(), ai);

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "ship my items to my address")
        .await;

    assert!(turn.needs_approval);
    let pending = h.orchestrator.pending_approval(&session()).unwrap();
    assert_eq!(pending.action, "final_order_confirmation");

    // Resolution is bookkeeping for the external approver.
    let resolved = h
        .orchestrator
        .resolve_approval(&session(), true, None)
        .unwrap();
    assert_eq!(
        resolved.status,
        shop_concierge::domain::approval::ApprovalStatus::Approved
    );
}

#[tokio::test]
async fn benign_answers_do_not_need_approval() {
    let ai = MockAiProvider::new().with_answer("We have several nice monitors.");
    let h = harness(seeded_commerce(), ai);

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "tell me about monitors")
        .await;

    assert!(!turn.needs_approval);
    assert!(h.orchestrator.pending_approval(&session()).is_none());
}

#[tokio::test]
async fn session_admin_surface_round_trips() {
    let ai = MockAiProvider::new().with_answer("hello!");
    let h = harness(seeded_commerce(), ai);

    h.orchestrator
        .handle_message(&session(), None, "tell me something nice")
        .await;

    let sessions = h.orchestrator.sessions().await.unwrap();
    assert!(sessions.contains(&session()));

    let history = h.orchestrator.history(&session()).await.unwrap();
    assert_eq!(history.len(), 2);

    h.orchestrator.clear_session(&session()).await.unwrap();
    assert!(h.orchestrator.history(&session()).await.unwrap().is_empty());
}
