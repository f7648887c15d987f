//! PC-builder step handlers.
//!
//! One generic handler serves every component category: show a numbered
//! candidate menu, accept a selection or a skip, answer questions about
//! the listed products without consuming the selection, and advance by
//! rendering the next category's menu in the same turn. A category with
//! no available products is skipped automatically.

use std::sync::Arc;

use crate::domain::commerce::{ComponentCategory, PcBuild, Product, ProductQuery};
use crate::domain::conversation::input;
use crate::domain::foundation::{SessionId, UserId};
use crate::ports::{
    AiProvider, CommerceError, CommerceService, CompletionRequest, Message, RequestMetadata,
};

use super::{CandidateMenu, PcBuilderState, PcBuilderStep};

/// How many candidates each category menu shows.
const MENU_LIMIT: u32 = 5;

/// Result of one builder turn: the reply to show and the state to
/// persist for the next message.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderOutcome {
    pub reply: String,
    pub state: PcBuilderState,
}

impl BuilderOutcome {
    fn stay(reply: impl Into<String>, state: PcBuilderState) -> Self {
        Self {
            reply: reply.into(),
            state,
        }
    }

    fn reset(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            state: PcBuilderState::default(),
        }
    }
}

/// The deterministic PC-builder flow.
#[derive(Clone)]
pub struct PcBuilderFlow {
    commerce: Arc<dyn CommerceService>,
    ai: Arc<dyn AiProvider>,
}

impl PcBuilderFlow {
    pub fn new(commerce: Arc<dyn CommerceService>, ai: Arc<dyn AiProvider>) -> Self {
        Self { commerce, ai }
    }

    /// Handles one turn at the given step.
    pub async fn handle(
        &self,
        step: PcBuilderStep,
        state: PcBuilderState,
        user: Option<&UserId>,
        session: &SessionId,
        user_input: &str,
    ) -> BuilderOutcome {
        tracing::debug!(step = step.as_key(), "pc builder turn");

        let result = match step {
            PcBuilderStep::None => {
                self.category_step(ComponentCategory::Ram, state, user, session, user_input)
                    .await
            }
            PcBuilderStep::Category(category) => {
                self.category_step(category, state, user, session, user_input)
                    .await
            }
            PcBuilderStep::Completed => Ok(self.completed_step(state, user_input).await),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "pc builder step failed; resetting flow");
            BuilderOutcome::reset(format!("Error in PC builder: {e}"))
        })
    }

    async fn category_step(
        &self,
        category: ComponentCategory,
        mut state: PcBuilderState,
        user: Option<&UserId>,
        session: &SessionId,
        user_input: &str,
    ) -> Result<BuilderOutcome, CommerceError> {
        state.active = true;
        state.step = PcBuilderStep::Category(category);

        // A menu is on screen: interpret the reply against it.
        if let Some(menu) = state.data.menu_for(category).cloned() {
            if input::is_question_or_conversation(user_input) {
                let reply = self
                    .answer_question(category, &menu.products, session, user, user_input)
                    .await;
                return Ok(BuilderOutcome::stay(reply, state));
            }

            if input::is_skip(user_input) {
                let preamble = format!("⏭️ Skipped {} selection.\n\n", category.label());
                return self.advance(state, category, preamble).await;
            }

            if let Some(n) = input::bare_digit(user_input) {
                let count = menu.products.len();
                if n >= 1 && (n as usize) <= count {
                    let chosen = menu.products[n as usize - 1].clone();
                    let build_id = self.ensure_build(&mut state, user, session).await?;
                    self.commerce
                        .add_build_component(&build_id, category, &chosen.id)
                        .await?;

                    let preamble = format!("✅ **{}** selected!\n\n", chosen.name);
                    return self.advance(state, category, preamble).await;
                }
                return Ok(BuilderOutcome::stay(
                    "Invalid selection. Please enter a number from the list or 0 to skip.",
                    state,
                ));
            }

            // Unmatched reply: repeat the menu.
            let reply = render_menu(category, &menu.products);
            return Ok(BuilderOutcome::stay(reply, state));
        }

        // First visit to this step: create the build lazily on the first
        // category, then fetch and show candidates.
        if category == ComponentCategory::Ram && state.data.build_id.is_none() {
            self.ensure_build(&mut state, user, session).await?;
        }
        let reply = self.fetch_and_render(&mut state, category, String::new()).await?;
        Ok(BuilderOutcome::stay(reply, state))
    }

    /// Terminal step: persist the chosen components into the cart on
    /// acceptance; always clears the flow.
    async fn completed_step(&self, state: PcBuilderState, user_input: &str) -> BuilderOutcome {
        if input::accepts_build(user_input) {
            let Some(build_id) = state.data.build_id.clone() else {
                return BuilderOutcome::reset("Build not found.");
            };
            return match self.commerce.save_build_to_cart(&build_id).await {
                Ok(count) => BuilderOutcome::reset(format!(
                    "✅ Added {count} component(s) to your cart!"
                )),
                Err(e) => BuilderOutcome::reset(format!("Failed to add to cart: {e}")),
            };
        }

        BuilderOutcome::reset("PC build saved. You can start a new build anytime!")
    }

    /// Moves past `category`: renders the next category's menu, or the
    /// build summary if this was the last one.
    async fn advance(
        &self,
        mut state: PcBuilderState,
        category: ComponentCategory,
        preamble: String,
    ) -> Result<BuilderOutcome, CommerceError> {
        match category.next() {
            Some(next) => {
                let reply = self.fetch_and_render(&mut state, next, preamble).await?;
                Ok(BuilderOutcome::stay(reply, state))
            }
            None => {
                state.step = PcBuilderStep::Completed;
                state.data.shown = None;
                let summary = self.render_build_summary(&state).await;
                Ok(BuilderOutcome::stay(format!("{preamble}{summary}"), state))
            }
        }
    }

    /// Fetches candidates for a category and renders its menu, skipping
    /// forward past categories with an empty catalog.
    async fn fetch_and_render(
        &self,
        state: &mut PcBuilderState,
        mut category: ComponentCategory,
        mut preamble: String,
    ) -> Result<String, CommerceError> {
        loop {
            let products = self
                .commerce
                .list_products(ProductQuery::category(category.catalog_name(), MENU_LIMIT))
                .await?;

            if products.is_empty() {
                preamble.push_str(&format!(
                    "Sorry, no {} products available right now. Skipping this step.\n\n",
                    category.label()
                ));
                match category.next() {
                    Some(next) => {
                        category = next;
                        continue;
                    }
                    None => {
                        state.step = PcBuilderStep::Completed;
                        state.data.shown = None;
                        let summary = self.render_build_summary(state).await;
                        preamble.push_str(&summary);
                        return Ok(preamble);
                    }
                }
            }

            state.step = PcBuilderStep::Category(category);
            state.data.shown = Some(CandidateMenu {
                category,
                products: products.clone(),
            });
            preamble.push_str(&render_menu(category, &products));
            return Ok(preamble);
        }
    }

    /// Returns the build id, creating the build record if necessary.
    async fn ensure_build(
        &self,
        state: &mut PcBuilderState,
        user: Option<&UserId>,
        session: &SessionId,
    ) -> Result<crate::domain::foundation::BuildId, CommerceError> {
        if let Some(id) = state.data.build_id.clone() {
            return Ok(id);
        }
        let id = self.commerce.start_build(user, session).await?;
        state.data.build_id = Some(id.clone());
        Ok(id)
    }

    /// Answers a question about the products on screen, grounded on the
    /// cached candidate list, without consuming the selection.
    async fn answer_question(
        &self,
        category: ComponentCategory,
        products: &[Product],
        session: &SessionId,
        user: Option<&UserId>,
        user_input: &str,
    ) -> String {
        let mut context = format!(
            "Currently showing {} options:\n",
            category.catalog_name()
        );
        for (idx, product) in products.iter().enumerate() {
            context.push_str(&format!("{}. {} - ${}\n", idx + 1, product.name, product.price));
            if let Some(desc) = &product.description {
                let short: String = desc.chars().take(100).collect();
                context.push_str(&format!("   Specs: {short}\n"));
            }
        }

        let system_prompt = format!(
            "You are helping a user build a custom PC. They are currently at the {} \
             selection step.\n\n{context}\n\
             Answer their question naturally and helpfully. After answering, remind them \
             they can:\n\
             - Enter a number (1-{}) to select that {}\n\
             - Enter 0 or 'skip' to skip this component\n\
             - Ask more questions about the products\n\n\
             Keep your response concise and helpful.",
            category.catalog_name().to_uppercase(),
            products.len(),
            category.label()
        );

        let request = CompletionRequest::new(RequestMetadata::new(
            session.clone(),
            user.cloned(),
        ))
        .with_system_prompt(system_prompt)
        .with_message(Message::user(user_input))
        .with_max_tokens(400)
        .with_temperature(0.2);

        match self.ai.complete(request).await {
            Ok(response) => response.content,
            Err(e) => {
                tracing::warn!(error = %e, "builder question answering failed");
                format!(
                    "I understand you have a question. {context}\n\
                     Please enter a number to select, or 0 to skip."
                )
            }
        }
    }

    /// Renders the completed build summary with the add-to-cart prompt.
    async fn render_build_summary(&self, state: &PcBuilderState) -> String {
        let build = match &state.data.build_id {
            Some(id) => self.commerce.build(id).await.ok().flatten(),
            None => None,
        };

        match build {
            Some(build) if !build.components.is_empty() => {
                format!(
                    "{}\n\nWould you like to add these components to your cart? (yes/no)",
                    render_components(&build)
                )
            }
            _ => "🧾 Your PC build is complete.\n\n\
                  Would you like to add the selected components to your cart? (yes/no)"
                .to_string(),
        }
    }
}

fn render_components(build: &PcBuild) -> String {
    let mut message = String::from("🧾 **Your PC Build Summary**\n");
    for category in ComponentCategory::ORDER {
        if let Some(component) = build.components.get(&category) {
            message.push_str(&format!(
                "\n• {}: {} - ${:.2}",
                category.label(),
                component.name,
                component.price
            ));
        }
    }
    message.push_str(&format!("\n\n**Total:** ${:.2}", build.total_price));
    message
}

fn step_icon(category: ComponentCategory) -> &'static str {
    match category {
        ComponentCategory::Ram => "🖥️",
        ComponentCategory::Ssd => "💾",
        ComponentCategory::Cpu => "⚙️",
        ComponentCategory::Gpu => "🎮",
        ComponentCategory::Psu => "🔌",
        ComponentCategory::Motherboard => "🔲",
        ComponentCategory::AirCooler => "❄️",
        ComponentCategory::Case => "📦",
    }
}

/// Renders the numbered candidate menu for a category.
fn render_menu(category: ComponentCategory, products: &[Product]) -> String {
    let mut message = format!(
        "{} **PC Builder - Step {}: Select {}**\n\nChoose a {} option:\n\n",
        step_icon(category),
        category.step_number(),
        category.label(),
        category.label()
    );
    for (idx, product) in products.iter().enumerate() {
        message.push_str(&format!(
            "**{}. {}** - ${}\n",
            idx + 1,
            product.name,
            product.price
        ));
        if let Some(blurb) = product.menu_blurb() {
            message.push_str(&format!("   {blurb}\n"));
        }
        message.push('\n');
    }
    message.push_str("**0. Skip this step**\n\n");
    message.push_str("Enter the number of your choice (or 0 to skip):");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commerce::{BuildComponent, BuildStatus};
    use crate::domain::foundation::{BuildId, ProductId};
    use std::collections::HashMap;

    fn product(name: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(name),
            name: name.to_string(),
            description: Some(format!("{name} description")),
            category: Some("RAM".to_string()),
            price,
            stock: Some(5),
            rating: None,
        }
    }

    #[test]
    fn menu_numbers_products_and_offers_skip() {
        let menu = render_menu(
            ComponentCategory::Ram,
            &[product("DDR5 32GB", 129.0), product("DDR4 16GB", 59.0)],
        );
        assert!(menu.contains("Step 1: Select RAM"));
        assert!(menu.contains("**1. DDR5 32GB** - $129"));
        assert!(menu.contains("**2. DDR4 16GB** - $59"));
        assert!(menu.contains("**0. Skip this step**"));
    }

    #[test]
    fn menu_render_is_deterministic() {
        let products = [product("DDR5 32GB", 129.0)];
        assert_eq!(
            render_menu(ComponentCategory::Ram, &products),
            render_menu(ComponentCategory::Ram, &products)
        );
    }

    #[test]
    fn menu_uses_category_step_number() {
        let menu = render_menu(ComponentCategory::Case, &[product("Mid Tower", 99.0)]);
        assert!(menu.contains("Step 8: Select Case"));
    }

    #[test]
    fn build_summary_lists_components_in_order() {
        let mut components = HashMap::new();
        components.insert(
            ComponentCategory::Cpu,
            BuildComponent {
                product_id: ProductId::new("cpu-1"),
                name: "Ryzen 7".to_string(),
                price: 299.0,
            },
        );
        components.insert(
            ComponentCategory::Ram,
            BuildComponent {
                product_id: ProductId::new("ram-1"),
                name: "DDR5 32GB".to_string(),
                price: 129.0,
            },
        );
        let build = PcBuild {
            id: BuildId::new("b-1"),
            components,
            total_price: 428.0,
            status: BuildStatus::InProgress,
        };

        let summary = render_components(&build);
        let ram_pos = summary.find("RAM").unwrap();
        let cpu_pos = summary.find("CPU").unwrap();
        assert!(ram_pos < cpu_pos, "components must render in builder order");
        assert!(summary.contains("**Total:** $428.00"));
    }
}
