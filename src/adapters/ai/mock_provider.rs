//! Mock AI Provider for testing.
//!
//! Configurable scripted implementation of the AiProvider port, allowing
//! tests to run whole turns without a real model.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Tool-call replies for exercising the reasoning loop
//! - Simulated delays for timeout testing
//! - Error injection and call tracking

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::tools::ToolCall;
use crate::ports::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A final answer with no tool calls.
    Answer(String),
    /// A set of requested tool invocations.
    ToolCalls(Vec<ToolCall>),
    /// A provider failure.
    Unavailable(String),
    /// A provider-side timeout.
    Timeout,
}

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAiProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Duration,
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Creates a new mock provider with no scripted replies.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    /// Queues a plain answer.
    pub fn with_answer(self, content: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Answer(content.into()));
        self
    }

    /// Queues a tool-call reply.
    pub fn with_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::ToolCalls(calls));
        self
    }

    /// Queues an arbitrary scripted reply.
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn recorded_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Answer("This is a mock response.".to_string()))
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply() {
            MockReply::Answer(content) => Ok(CompletionResponse {
                content,
                tool_calls: Vec::new(),
                usage: TokenUsage::new(10, 20, 0),
                model: "mock-model-1".to_string(),
                finish_reason: FinishReason::Stop,
            }),
            MockReply::ToolCalls(tool_calls) => Ok(CompletionResponse {
                content: String::new(),
                tool_calls,
                usage: TokenUsage::new(10, 5, 0),
                model: "mock-model-1".to_string(),
                finish_reason: FinishReason::ToolCalls,
            }),
            MockReply::Unavailable(message) => Err(AiError::unavailable(message)),
            MockReply::Timeout => Err(AiError::Timeout { timeout_secs: 60 }),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1", 128_000).with_tools(true)
    }
}
