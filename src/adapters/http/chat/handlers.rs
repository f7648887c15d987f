//! Axum handlers for the chat endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};

use crate::application::{stream_turn, SessionOrchestrator};
use crate::domain::foundation::{SessionId, UserId};

use super::dto::{ApprovalDecision, ApprovalView, ChatRequest, ChatResponse, HistoryResponse};

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: Arc<SessionOrchestrator>,
}

fn resolve_ids(request: &ChatRequest) -> (SessionId, Option<UserId>) {
    let session = request
        .session_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(SessionId::new)
        .unwrap_or_else(SessionId::generate);
    let user = request
        .user_id
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .map(UserId::new);
    (session, user)
}

/// POST /api/chat
pub async fn chat(
    State(state): State<ChatAppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let (session, user) = resolve_ids(&request);
    let turn = state
        .orchestrator
        .handle_message(&session, user, &request.message)
        .await;

    Json(ChatResponse {
        response: turn.reply,
        session_id: turn.session_id.to_string(),
        needs_approval: turn.needs_approval,
    })
}

/// POST /api/chat/stream (SSE)
pub async fn chat_stream(
    State(state): State<ChatAppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, user) = resolve_ids(&request);
    let events = stream_turn(
        state.orchestrator.clone(),
        session,
        user,
        request.message.clone(),
    )
    .map(|event| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("serialization error")))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<ChatAppState>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let sessions = state
        .orchestrator
        .sessions()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(sessions.iter().map(|s| s.to_string()).collect()))
}

/// GET /api/sessions/{session_id}/history
pub async fn get_history(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let session = SessionId::new(session_id);
    let turns = state
        .orchestrator
        .history(&session)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(HistoryResponse {
        session_id: session.to_string(),
        turns,
    }))
}

/// DELETE /api/sessions/{session_id}
pub async fn delete_session(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state
        .orchestrator
        .clear_session(&SessionId::new(session_id))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/approvals/{session_id}
pub async fn get_approval(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApprovalView>, StatusCode> {
    let session = SessionId::new(session_id);
    let approval = state
        .orchestrator
        .pending_approval(&session)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(ApprovalView {
        session_id: session.to_string(),
        approval,
    }))
}

/// POST /api/approvals/{session_id}
pub async fn resolve_approval(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
    Json(decision): Json<ApprovalDecision>,
) -> Result<Json<ApprovalView>, StatusCode> {
    let session = SessionId::new(session_id);
    let approval = state
        .orchestrator
        .resolve_approval(&session, decision.approved, decision.feedback)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(ApprovalView {
        session_id: session.to_string(),
        approval,
    }))
}
