//! Chat HTTP surface: message submission, streaming, session history
//! and approval administration.

mod dto;
mod handlers;
mod routes;

pub use dto::{ApprovalDecision, ChatRequest, ChatResponse, HistoryResponse};
pub use handlers::ChatAppState;
pub use routes::chat_router;
