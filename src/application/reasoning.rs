//! General reasoning path.
//!
//! Fast paths first (greetings, bare tracking numbers), then the response
//! cache, then a bounded tool-calling loop against the reasoning engine:
//! `while the model requests tools { execute; append results; re-invoke }`
//! up to a fixed iteration cap. The engine call carries a hard timeout;
//! a timed-out or failed call produces a normal assistant reply and is
//! not retried.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::conversation::input;
use crate::domain::conversation::tools::{
    is_cart_tool, names, ToolCall, ToolExecutor, ToolRegistry, ToolResult,
};
use crate::domain::conversation::{Turn, TurnRole};
use crate::domain::foundation::{SessionId, UserId};
use crate::ports::{AiError, AiProvider, CompletionRequest, Message, RequestMetadata};

use super::ResponseCache;

/// Iteration cap for the tool loop; prevents a model that keeps asking
/// for tools from spinning forever.
const MAX_TOOL_ITERATIONS: usize = 8;

/// Reasoning message list cap; beyond this the list is trimmed while
/// preserving assistant-toolcall/tool-result pairs.
const MESSAGE_WINDOW: usize = 8;

const TIMEOUT_REPLY: &str =
    "Sorry, I'm taking too long to respond. Please try a simpler question.";

/// Result of a general-path turn.
#[derive(Debug, Clone)]
pub struct GeneralOutcome {
    /// Final assistant reply.
    pub reply: String,
    /// Every tool result executed during the turn, for the approval gate.
    pub tool_results: Vec<ToolResult>,
}

impl GeneralOutcome {
    fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            tool_results: Vec::new(),
        }
    }
}

/// The reasoning loop and its fast paths.
pub struct ReasoningEngine {
    ai: Arc<dyn AiProvider>,
    registry: ToolRegistry,
    executor: ToolExecutor,
    cache: ResponseCache,
    timeout: Duration,
}

impl ReasoningEngine {
    pub fn new(
        ai: Arc<dyn AiProvider>,
        registry: ToolRegistry,
        executor: ToolExecutor,
        cache: ResponseCache,
        timeout: Duration,
    ) -> Self {
        Self {
            ai,
            registry,
            executor,
            cache,
            timeout,
        }
    }

    /// Produces the reply for a general-path turn.
    pub async fn respond(
        &self,
        session: &SessionId,
        user: Option<&UserId>,
        history: &[Turn],
        user_input: &str,
    ) -> GeneralOutcome {
        // Exact-match greetings never touch the engine.
        if let Some(reply) = input::greeting_reply(user_input) {
            return GeneralOutcome::plain(reply);
        }

        // Bare order/tracking numbers go straight to the lookup tool.
        if input::is_tracking_code(user_input) {
            tracing::debug!("tracking-code fast path");
            return self.track_order_fast_path(user_input, user).await;
        }

        let context_summary = context_summary(history);

        // Cached answer, unless the query needs fresh store state.
        if !input::is_transactional(user_input) {
            if let Some(cached) = self.cache.get(user_input, &context_summary) {
                return GeneralOutcome::plain(cached);
            }
        }

        self.reasoning_loop(session, user, history, user_input, &context_summary)
            .await
    }

    /// Executes the order lookup directly, bypassing the engine.
    async fn track_order_fast_path(
        &self,
        user_input: &str,
        user: Option<&UserId>,
    ) -> GeneralOutcome {
        let call = ToolCall::new(
            "fast-path",
            names::TRACK_ORDER,
            json!({ "order_number": user_input.trim() }),
        );
        let result = self.executor.execute(&call, user).await;

        let reply = match &result {
            ToolResult::Success(_) => result
                .display_message()
                .map(str::to_string)
                .unwrap_or_else(|| result.to_content()),
            ToolResult::Failed { message } | ToolResult::LoginRequired { message } => {
                message.clone()
            }
        };

        GeneralOutcome {
            reply,
            tool_results: vec![result],
        }
    }

    async fn reasoning_loop(
        &self,
        session: &SessionId,
        user: Option<&UserId>,
        history: &[Turn],
        user_input: &str,
        context_summary: &str,
    ) -> GeneralOutcome {
        let metadata = RequestMetadata::new(session.clone(), user.cloned());
        let system_prompt = build_system_prompt(user);
        let tools = self.registry.to_openai_tools();

        // Bounded context: at most the single most recent prior turn.
        let mut messages: Vec<Message> = Vec::new();
        if let Some(last) = history.last() {
            messages.push(match last.role {
                TurnRole::User => Message::user(last.content.as_str()),
                TurnRole::Assistant => Message::assistant(last.content.as_str()),
            });
        }
        messages.push(Message::user(user_input));

        let mut tool_results: Vec<ToolResult> = Vec::new();
        let mut last_cart_output: Option<String> = None;

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let mut request = CompletionRequest::new(metadata.clone())
                .with_system_prompt(system_prompt.clone())
                .with_tools(tools.clone())
                .with_max_tokens(400)
                .with_temperature(0.2);
            request.messages = messages.clone();

            let response = match tokio::time::timeout(self.timeout, self.ai.complete(request))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(AiError::Timeout { .. })) | Err(_) => {
                    tracing::error!("reasoning engine call timed out");
                    return GeneralOutcome {
                        reply: TIMEOUT_REPLY.to_string(),
                        tool_results,
                    };
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "reasoning engine call failed");
                    return GeneralOutcome {
                        reply: format!("I encountered an error: {e}. Please try again."),
                        tool_results,
                    };
                }
            };

            if !response.has_tool_calls() {
                let mut reply = response.content;

                // Hallucination guard: a cart-status answer claiming an
                // empty cart loses to an authoritative cart tool output
                // captured earlier in this turn.
                if input::is_cart_status_query(user_input)
                    && !input::is_checkout_intent(user_input)
                    && reply.to_lowercase().contains("cart is empty")
                {
                    if let Some(cart_output) = &last_cart_output {
                        tracing::debug!("overriding empty-cart claim with tool output");
                        reply = cart_output.clone();
                    }
                }

                // Cache anonymous, non-personal answers only.
                if user.is_none() && !input::is_personal(user_input) {
                    self.cache.set(user_input, reply.clone(), context_summary);
                }

                return GeneralOutcome {
                    reply,
                    tool_results,
                };
            }

            tracing::debug!(
                iteration,
                count = response.tool_calls.len(),
                "model requested tool calls"
            );

            messages.push(Message::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = self.executor.execute(call, user).await;

                if is_cart_tool(&call.name) {
                    if let Some(display) = result.display_message() {
                        last_cart_output = Some(display.to_string());
                    } else if result.payload().is_some() {
                        last_cart_output = Some(result.to_content());
                    }
                }

                messages.push(Message::tool_result(&call.id, result.to_content()));
                tool_results.push(result);
            }

            trim_messages(&mut messages);
        }

        tracing::warn!("tool loop hit iteration cap");
        GeneralOutcome {
            reply: "I'm having trouble completing that request. Please try again.".to_string(),
            tool_results,
        }
    }
}

/// Short context string for cache keys: the last three turns, 50 chars
/// each, capped at 200.
fn context_summary(history: &[Turn]) -> String {
    let recent: Vec<String> = history
        .iter()
        .rev()
        .take(3)
        .rev()
        .map(|t| t.content.chars().take(50).collect())
        .collect();
    recent.join(" ").chars().take(200).collect()
}

/// The fixed system instruction: tool routing guidance plus the current
/// user identifier.
fn build_system_prompt(user: Option<&UserId>) -> String {
    let user_line = user
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| "(not logged in)".to_string());

    format!(
        "You are an agentic e-commerce assistant. Always pick the tool that matches the \
         user's intent.\n\n\
         CART INTENTS:\n\
         - 'what's in my cart' / 'show cart' / 'cart summary' → use get_cart_summary\n\
         - 'empty/clear/flush cart' → use empty_cart (do NOT summarize first)\n\n\
         PRODUCT INTENTS:\n\
         - 'search/find/browse products' → use search_products (or other product tools)\n\n\
         ORDER TRACKING INTENTS:\n\
         - 'track order [number]' / 'where is order [number]' / 'order status [number]' → \
         use track_order (accepts order number or tracking number)\n\
         - 'show my orders' / 'my orders' / 'order history' → use get_orders\n\
         - 'order details [id]' → use get_order_details\n\n\
         IMPORTANT: When a tool returns a response, ALWAYS relay the tool's message field \
         EXACTLY as provided. Do NOT summarize, rephrase, or add your own interpretation. \
         Just pass through the tool's message.\n\n\
         NEVER guess cart contents or order status without a tool call. If unsure, ask a \
         brief clarifying question, then call the correct tool.\n\
         User ID: {user_line}"
    )
}

/// Trims the reasoning message list past the window, keeping
/// assistant-toolcall/tool-result pairs intact: if the first survivor is
/// a tool result, the assistant message that requested it is pulled in
/// too.
fn trim_messages(messages: &mut Vec<Message>) {
    use crate::ports::MessageRole;

    if messages.len() <= MESSAGE_WINDOW {
        return;
    }

    let keep_from = messages.len() - (MESSAGE_WINDOW - 2);
    let mut trimmed: Vec<Message> = Vec::new();

    if messages[keep_from].role == MessageRole::Tool {
        if let Some(requester) = messages[..keep_from]
            .iter()
            .rev()
            .find(|m| m.has_tool_calls())
        {
            trimmed.push(requester.clone());
        }
    }

    trimmed.extend_from_slice(&messages[keep_from..]);
    *messages = trimmed;
}
