use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{ChatSession, ChatStore, SessionStore};
use crate::error::ServerError;
use crate::schemas::v1::session::{
    BulkDeleteRequest, BulkDeleteResponse, CreateSessionRequest, MessageResponse, SessionResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session,
        list_sessions,
        delete_session,
        list_session_messages,
        bulk_delete_sessions
    ),
    components(schemas(
        CreateSessionRequest,
        SessionResponse,
        MessageResponse,
        BulkDeleteRequest,
        BulkDeleteResponse
    ))
)]
pub struct SessionApi;

/// Register session routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/messages", get(list_session_messages))
        .route("/sessions/bulk-delete", post(bulk_delete_sessions))
}

// ── Session handlers ──────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let session = ChatSession::new(Uuid::new_v4().to_string(), req.title);
    state.store.create_session(session.clone()).await?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    get,
    path = "/v1/sessions",
    tag = "sessions",
    responses(
        (status = 200, description = "Session list, newest first", body = Vec<SessionResponse>),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionResponse>>, ServerError> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}",
    tag = "sessions",
    responses(
        (status = 200, description = "Session deleted", body = serde_json::Value),
        (status = 404, description = "No such session"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.store.delete_session(&id).await? {
        return Err(ServerError::NotFound(format!("session {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/messages",
    tag = "sessions",
    responses(
        (status = 200, description = "Messages in chronological order", body = Vec<MessageResponse>),
        (status = 404, description = "No such session"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_session_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    state
        .store
        .get_session(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("session {id} not found")))?;
    let messages = state.store.list_messages(&id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/sessions/bulk-delete",
    tag = "sessions",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Sessions deleted", body = BulkDeleteResponse),
        (status = 400, description = "Empty id list"),
        (status = 404, description = "None of the ids exist"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn bulk_delete_sessions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ServerError> {
    if req.session_ids.is_empty() {
        return Err(ServerError::BadRequest("session_ids is empty".into()));
    }
    let mut deleted = Vec::new();
    for id in &req.session_ids {
        if state.store.delete_session(id).await? {
            deleted.push(id.clone());
        }
    }
    if deleted.is_empty() {
        return Err(ServerError::NotFound(
            "none of the given sessions exist".into(),
        ));
    }
    Ok(Json(BulkDeleteResponse {
        success: true,
        deleted_count: deleted.len(),
        deleted_session_ids: deleted,
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
