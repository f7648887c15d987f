//! Application layer - per-turn orchestration over the domain and ports.

mod orchestrator;
mod reasoning;
mod response_cache;
mod stream;

pub use orchestrator::{SessionOrchestrator, TurnReply};
pub use reasoning::{GeneralOutcome, ReasoningEngine};
pub use response_cache::ResponseCache;
pub use stream::{stream_turn, ChatEvent};
