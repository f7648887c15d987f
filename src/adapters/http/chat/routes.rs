//! Axum routes for chat endpoints.
//!
//! REST Endpoints:
//! - POST /api/chat - submit a message, get the full reply
//! - POST /api/chat/stream - submit a message, stream the reply (SSE)
//! - GET /api/sessions - list known sessions
//! - GET /api/sessions/{session_id}/history - persisted turn log
//! - DELETE /api/sessions/{session_id} - delete a session
//! - GET /api/approvals/{session_id} - pending approval for a session
//! - POST /api/approvals/{session_id} - resolve a pending approval

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers::{
    chat, chat_stream, delete_session, get_approval, get_history, list_sessions,
    resolve_approval, ChatAppState,
};

/// Creates routes for chat endpoints.
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session_id}/history", get(get_history))
        .route("/sessions/{session_id}", delete(delete_session))
        .route(
            "/approvals/{session_id}",
            get(get_approval).post(resolve_approval),
        )
}

/// Combined router with all chat routes under /api.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new().nest("/api", chat_routes())
}
