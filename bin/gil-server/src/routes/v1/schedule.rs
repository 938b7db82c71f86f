use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{ScheduleRecord, ScheduleStore, SessionStore};
use crate::error::ServerError;
use crate::schemas::v1::schedule::{
    SaveScheduleRequest, SaveScheduleResponse, ScheduleLookupResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(save_schedule, get_schedule, find_session_schedule),
    components(schemas(SaveScheduleRequest, SaveScheduleResponse, ScheduleLookupResponse))
)]
pub struct ScheduleApi;

/// Register schedule routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedules", post(save_schedule))
        .route("/schedules/{id}", get(get_schedule))
        .route("/sessions/{id}/schedule", get(find_session_schedule))
}

// ── Schedule handlers ─────────────────────────────────────────────────────────

/// Persist an itinerary.
///
/// When the linked session carries a pending schedule from the last agent
/// turn, that blob wins over whatever the client posted; an empty blob
/// falls back to a skeleton itinerary so the save never produces an empty
/// record.
#[utoipa::path(
    post,
    path = "/v1/schedules",
    tag = "schedules",
    request_body = SaveScheduleRequest,
    responses(
        (status = 200, description = "Schedule stored", body = SaveScheduleResponse),
        (status = 400, description = "Neither question nor title given"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn save_schedule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveScheduleRequest>,
) -> Result<Json<SaveScheduleResponse>, ServerError> {
    let title = req
        .question
        .as_deref()
        .or(req.title.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServerError::BadRequest("question or title is required".into()))?;

    let session = match &req.session_id {
        Some(id) => state.store.get_session(id).await?,
        None => None,
    };

    let mut data = req.data;
    if let Some(pending) = session
        .as_ref()
        .and_then(|s| s.pending_schedule.as_deref())
        .and_then(|raw| serde_json::from_str(raw).ok())
    {
        data = pending;
    }
    if gil_types::schedule::is_empty_blob(&data) {
        data = gil_types::schedule::default_schedule();
    }

    let record = ScheduleRecord {
        id: Uuid::new_v4().to_string(),
        session_id: session.as_ref().map(|s| s.id.clone()),
        title: title.clone(),
        data: serde_json::to_string(&data).map_err(|e| ServerError::Internal(e.to_string()))?,
        created_at: Utc::now(),
    };
    state.store.create_schedule(record.clone()).await?;

    // The question becomes the session title so the session can find its
    // schedule again by title match.
    if let Some(s) = &session {
        state.store.update_session_title(&s.id, &title).await?;
    }

    Ok(Json(SaveScheduleResponse {
        success: true,
        id: record.id,
        session_id: record.session_id,
        message: "일정이 성공적으로 저장되었습니다.".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/schedules/{id}",
    tag = "schedules",
    responses(
        (status = 200, description = "Stored itinerary JSON", body = serde_json::Value),
        (status = 404, description = "No such schedule"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let record = state
        .store
        .get_schedule(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("schedule {id} not found")))?;
    let data = serde_json::from_str(&record.data)
        .map_err(|e| ServerError::Internal(format!("stored schedule is not JSON: {e}")))?;
    Ok(Json(data))
}

/// Find the schedule that belongs to a session.
///
/// Matching is by title: saving a schedule renames its session, so the
/// newest schedule with the same title is the session's own.
#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/schedule",
    tag = "schedules",
    responses(
        (status = 200, description = "Schedule id, or a message when none matches", body = ScheduleLookupResponse),
        (status = 404, description = "No such session, or the session has no title"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn find_session_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleLookupResponse>, ServerError> {
    let session = state
        .store
        .get_session(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("session {id} not found")))?;
    let title = session
        .title
        .ok_or_else(|| ServerError::NotFound("session has no title".into()))?;

    match state.store.latest_schedule_by_title(&title).await? {
        Some(record) => Ok(Json(ScheduleLookupResponse {
            schedule_id: Some(record.id),
            message: None,
        })),
        None => Ok(Json(ScheduleLookupResponse {
            schedule_id: None,
            message: Some("해당 세션과 매칭되는 일정이 없습니다.".into()),
        })),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{AnyStore, ChatSession};

    async fn memory_store() -> AnyStore {
        AnyStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn pending_schedule_wins_over_posted_data() {
        let store = memory_store().await;
        let mut session = ChatSession::new("s".into(), None);
        session.pending_schedule = Some(r#"{"schedule":{"Day1":{}}}"#.into());
        store.create_session(session).await.unwrap();
        store
            .update_session_context("s", None, Some(r#"{"schedule":{"Day1":{}}}"#))
            .await
            .unwrap();

        let loaded = store.get_session("s").await.unwrap().unwrap();
        let pending: serde_json::Value =
            serde_json::from_str(loaded.pending_schedule.as_deref().unwrap()).unwrap();
        assert!(pending["schedule"]["Day1"].is_object());
    }

    #[test]
    fn empty_blob_gets_the_skeleton() {
        assert!(gil_types::schedule::is_empty_blob(&serde_json::Value::Null));
        assert!(gil_types::schedule::is_empty_blob(&serde_json::json!({})));
        assert!(!gil_types::schedule::is_empty_blob(
            &serde_json::json!({"schedule": {}})
        ));
        let fallback = gil_types::schedule::default_schedule();
        assert!(fallback["schedule"]["Day1"]["오전활동"].is_object());
    }

    #[tokio::test]
    async fn title_match_returns_the_latest_schedule() {
        let store = memory_store().await;
        for (id, offset) in [("old", 0), ("new", 60)] {
            store
                .create_schedule(ScheduleRecord {
                    id: id.into(),
                    session_id: None,
                    title: "부산 여행".into(),
                    data: "{}".into(),
                    created_at: Utc::now() + chrono::Duration::seconds(offset),
                })
                .await
                .unwrap();
        }
        let hit = store
            .latest_schedule_by_title("부산 여행")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "new");
    }
}
