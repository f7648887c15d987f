//! Whole-turn integration tests for the PC-builder flow.

mod common;

use common::{full_catalog, harness, user};
use shop_concierge::adapters::ai::MockAiProvider;
use shop_concierge::adapters::commerce::InMemoryCommerce;
use shop_concierge::domain::commerce::ComponentCategory;
use shop_concierge::domain::conversation::RELOAD_WINDOW;
use shop_concierge::domain::foundation::SessionId;
use shop_concierge::domain::pc_builder::PcBuilderStep;
use shop_concierge::ports::{CommerceService, ConversationStore};

fn session() -> SessionId {
    SessionId::new("builder-session")
}

fn seeded_commerce() -> InMemoryCommerce {
    InMemoryCommerce::new().with_products(full_catalog())
}

async fn builder_step(
    h: &common::Harness,
) -> PcBuilderStep {
    h.store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap()
        .metadata
        .pc_builder
        .step
}

#[tokio::test]
async fn trigger_renders_ram_menu_and_persists_ram_step() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;

    assert!(turn.reply.contains("Step 1: Select RAM"), "got: {}", turn.reply);
    assert!(turn.reply.contains("**1. "));
    assert!(turn.reply.contains("**2. "));
    assert!(turn.reply.contains("**0. Skip this step**"));

    let record = h
        .store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap();
    assert!(record.metadata.pc_builder.is_active());
    assert_eq!(record.metadata.pc_builder.step.as_key(), "ram");
    // At most five candidates are offered.
    assert!(
        record
            .metadata
            .pc_builder
            .data
            .shown
            .as_ref()
            .unwrap()
            .products
            .len()
            <= 5
    );
}

#[tokio::test]
async fn builder_trigger_beats_checkout_trigger() {
    // Both trigger phrases in one message, no active flow: PC builder wins.
    let h = harness(seeded_commerce(), MockAiProvider::new());

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "build a pc and then checkout")
        .await;

    assert!(turn.reply.contains("PC Builder"), "got: {}", turn.reply);
}

#[tokio::test]
async fn selection_registers_component_and_renders_next_menu() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "1")
        .await;

    assert!(turn.reply.contains("selected!"), "got: {}", turn.reply);
    assert!(turn.reply.contains("Step 2: Select SSD"), "got: {}", turn.reply);
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Ssd)
    );

    // The chosen RAM landed on the build record.
    let record = h
        .store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap();
    let build_id = record.metadata.pc_builder.data.build_id.unwrap();
    let build = h.commerce.build(&build_id).await.unwrap().unwrap();
    assert!(build.components.contains_key(&ComponentCategory::Ram));
}

#[tokio::test]
async fn skip_advances_without_registering() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "0")
        .await;

    assert!(turn.reply.contains("Skipped RAM selection"), "got: {}", turn.reply);
    assert!(turn.reply.contains("Step 2: Select SSD"));
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Ssd)
    );
}

#[tokio::test]
async fn out_of_range_selection_does_not_mutate_state() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "9")
        .await;

    assert!(turn.reply.contains("Invalid selection"), "got: {}", turn.reply);
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Ram)
    );

    // The build has no components yet.
    let record = h
        .store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap();
    let build_id = record.metadata.pc_builder.data.build_id.unwrap();
    let build = h.commerce.build(&build_id).await.unwrap().unwrap();
    assert!(build.components.is_empty());
}

#[tokio::test]
async fn empty_category_is_skipped_automatically() {
    // No SSD products seeded: after RAM the flow must land on CPU.
    let products = full_catalog()
        .into_iter()
        .filter(|p| p.category.as_deref() != Some("SSD"))
        .collect::<Vec<_>>();
    let commerce = InMemoryCommerce::new().with_products(products);
    let h = harness(commerce, MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "1")
        .await;

    assert!(
        turn.reply.contains("no SSD products available"),
        "got: {}",
        turn.reply
    );
    assert!(turn.reply.contains("Select CPU"), "got: {}", turn.reply);
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Cpu)
    );
}

#[tokio::test]
async fn questions_are_answered_without_consuming_the_selection() {
    let ai = MockAiProvider::new().with_answer("The 32GB kit is better for heavy multitasking.");
    let h = harness(seeded_commerce(), ai);

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "which one do you recommend?")
        .await;

    assert_eq!(
        turn.reply,
        "The 32GB kit is better for heavy multitasking."
    );
    assert_eq!(h.ai.call_count(), 1);
    // Still on the RAM step; a selection afterwards works.
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Ram)
    );

    let after = h
        .orchestrator
        .handle_message(&session(), Some(user()), "1")
        .await;
    assert!(after.reply.contains("Step 2: Select SSD"));
}

#[tokio::test]
async fn grounding_context_contains_the_menu() {
    let ai = MockAiProvider::new().with_answer("answer");
    let h = harness(seeded_commerce(), ai);

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    h.orchestrator
        .handle_message(&session(), Some(user()), "what is the difference between them?")
        .await;

    let calls = h.ai.recorded_calls();
    assert_eq!(calls.len(), 1);
    let system = calls[0].system_prompt.as_deref().unwrap();
    assert!(system.contains("RAM"), "system prompt lacks grounding: {system}");
    assert!(system.contains("DDR5 32GB Kit"));
}

#[tokio::test]
async fn completing_all_steps_offers_cart_addition() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    // Select RAM, then skip the remaining seven categories.
    let mut last = h
        .orchestrator
        .handle_message(&session(), Some(user()), "1")
        .await
        .reply;
    for _ in 0..7 {
        last = h
            .orchestrator
            .handle_message(&session(), Some(user()), "skip")
            .await
            .reply;
    }

    assert!(last.contains("(yes/no)"), "got: {last}");
    assert_eq!(builder_step(&h).await, PcBuilderStep::Completed);

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "yes")
        .await;
    assert!(
        turn.reply.contains("Added 1 component(s) to your cart"),
        "got: {}",
        turn.reply
    );

    // Flow cleared, component in the cart.
    let record = h
        .store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap();
    assert!(!record.metadata.pc_builder.is_active());
    assert_eq!(record.metadata.pc_builder.step, PcBuilderStep::None);
    assert_eq!(h.commerce.cart_summary(&user()).await.unwrap().total_items, 1);
}

#[tokio::test]
async fn declining_the_build_still_clears_the_flow() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    h.orchestrator
        .handle_message(&session(), Some(user()), "1")
        .await;
    for _ in 0..7 {
        h.orchestrator
            .handle_message(&session(), Some(user()), "skip")
            .await;
    }

    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "no thanks")
        .await;
    assert!(turn.reply.contains("PC build saved"), "got: {}", turn.reply);

    let record = h
        .store
        .load(&session(), RELOAD_WINDOW)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.metadata.pc_builder.step, PcBuilderStep::None);
    assert!(h.commerce.cart_summary(&user()).await.unwrap().is_empty());
}

#[tokio::test]
async fn active_builder_preempts_checkout_trigger() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    h.orchestrator
        .handle_message(&session(), Some(user()), "build a pc")
        .await;
    // "checkout" while the builder is active is just an unmatched reply.
    let turn = h
        .orchestrator
        .handle_message(&session(), Some(user()), "checkout")
        .await;

    assert!(
        turn.reply.contains("Select RAM"),
        "builder should keep the turn: {}",
        turn.reply
    );
    assert_eq!(
        builder_step(&h).await,
        PcBuilderStep::Category(ComponentCategory::Ram)
    );
}

#[tokio::test]
async fn anonymous_user_can_build_but_not_save_to_cart() {
    let h = harness(seeded_commerce(), MockAiProvider::new());

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "build a pc")
        .await;
    assert!(turn.reply.contains("Select RAM"));

    h.orchestrator
        .handle_message(&session(), None, "1")
        .await;
    for _ in 0..7 {
        h.orchestrator
            .handle_message(&session(), None, "skip")
            .await;
    }

    let turn = h
        .orchestrator
        .handle_message(&session(), None, "yes")
        .await;
    assert!(
        turn.reply.contains("Failed to add to cart"),
        "got: {}",
        turn.reply
    );
}
