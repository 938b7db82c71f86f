use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use gil_agent::TurnRequest;
use utoipa::OpenApi;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{ChatMessage, ChatSession, ChatStore, SessionStore};
use crate::error::ServerError;
use crate::schemas::v1::chat::{ChatRequest, ChatResponse, PlacePin, VideoCard};
use crate::state::AppState;

/// How many past messages are replayed into the model context.
const HISTORY_WINDOW: i64 = 15;

/// Session title marking a schedule conversation.
const SCHEDULE_TITLE: &str = "🗓 여행 일정 추천";

#[derive(OpenApi)]
#[openapi(
    paths(post_chat),
    components(schemas(ChatRequest, ChatResponse, VideoCard, PlacePin))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(post_chat))
}

// ── Chat handler ──────────────────────────────────────────────────────────────

/// One conversational turn.
///
/// Creates the session on first contact, runs the agent, persists both
/// sides of the exchange and carries the detected destination and any
/// generated itinerary into the session for later turns.
#[utoipa::path(
    post,
    path = "/v1/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty or oversized message"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(ServerError::BadRequest("message is empty".into()));
    }

    // Load or create the session.
    let session = match &req.session_id {
        Some(id) => state
            .store
            .get_session(id)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("session {id} not found")))?,
        None => {
            let session = ChatSession::new(Uuid::new_v4().to_string(), None);
            state.store.create_session(session.clone()).await?;
            session
        }
    };

    // An untitled session takes its title from the first message that
    // declares what the user is after. The turn that titles the session as
    // a schedule conversation shows the save button right away, even before
    // a parseable itinerary exists.
    let mut just_became_schedule = false;
    let title = match &session.title {
        Some(t) => Some(t.clone()),
        None => {
            let inferred = infer_title(&message);
            if let Some(t) = inferred {
                state.store.update_session_title(&session.id, t).await?;
                just_became_schedule = t == SCHEDULE_TITLE;
            }
            inferred.map(str::to_string)
        }
    };

    let history = build_history(&state, &session, title.as_deref()).await?;

    state
        .store
        .append_message(ChatMessage {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            role: "user".into(),
            content: message.clone(),
            created_at: Utc::now(),
        })
        .await?;

    let pending_schedule = session
        .pending_schedule
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());
    let outcome = state
        .agent
        .handle(TurnRequest {
            input: &message,
            history,
            session_title: title.as_deref(),
            last_destination: session.last_destination.as_deref(),
            pending_schedule,
        })
        .await;

    // The assistant side is stored as markdown; HTML is a render-time view.
    state
        .store
        .append_message(ChatMessage {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            role: "assistant".into(),
            content: outcome.reply.clone(),
            created_at: Utc::now(),
        })
        .await?;

    let schedule_text = outcome
        .schedule_json
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    state
        .store
        .update_session_context(
            &session.id,
            outcome.detected_destination.as_deref(),
            schedule_text.as_deref(),
        )
        .await?;

    let places: Vec<PlacePin> = outcome.places.into_iter().map(PlacePin::from).collect();
    Ok(Json(ChatResponse {
        session_id: session.id,
        reply: outcome.reply,
        reply_html: outcome.reply_html,
        yt_html: outcome.yt_html,
        youtube: outcome.youtube.into_iter().map(VideoCard::from).collect(),
        map: places.clone(),
        places,
        save_button_enabled: outcome.save_button_enabled || just_became_schedule,
    }))
}

/// Map the opening message onto a session title. `None` leaves the session
/// untitled until a later message matches.
fn infer_title(message: &str) -> Option<&'static str> {
    if message.contains("일정") {
        Some(SCHEDULE_TITLE)
    } else if message.contains("맛집") {
        Some("🍴 맛집 추천")
    } else if message.contains("브이로그") || message.contains("유튜브") {
        Some("🎥 여행 브이로그 추천")
    } else {
        None
    }
}

/// Replay the recent window as `role: content` lines with a session header,
/// so the prompt can reference the title and when the conversation began.
async fn build_history(
    state: &AppState,
    session: &ChatSession,
    title: Option<&str>,
) -> Result<Vec<String>, ServerError> {
    let mut lines = Vec::new();
    if let Some(t) = title {
        lines.push(format!("세션 제목: {t}"));
    }
    lines.push(format!(
        "대화 시작 시간: {}",
        session.created_at.format("%Y-%m-%d %H:%M")
    ));
    for msg in state
        .store
        .recent_messages(&session.id, HISTORY_WINDOW)
        .await?
    {
        lines.push(format!("{}: {}", msg.role, msg.content));
    }
    Ok(lines)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn schedule_words_win_the_title() {
        assert_eq!(infer_title("부산 2박3일 일정 짜줘"), Some(SCHEDULE_TITLE));
    }

    #[test]
    fn food_and_vlog_titles() {
        assert_eq!(infer_title("전주 맛집 알려줘"), Some("🍴 맛집 추천"));
        assert_eq!(infer_title("여수 브이로그 보여줘"), Some("🎥 여행 브이로그 추천"));
        assert_eq!(infer_title("유튜브 영상 찾아줘"), Some("🎥 여행 브이로그 추천"));
    }

    #[test]
    fn small_talk_leaves_the_session_untitled() {
        assert_eq!(infer_title("안녕하세요"), None);
    }
}
