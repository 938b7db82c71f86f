use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use gil_providers::directions::{RouteError, PRIORITIES};
use gil_types::coords::Coordinate;
use serde_json::{json, Value};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::v1::route::{RoutePoint, RouteRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(post_route), components(schemas(RouteRequest, RoutePoint)))]
pub struct RouteApi;

/// Register route-search routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/route", post(post_route))
}

// ── Route handler ─────────────────────────────────────────────────────────────

/// Path-finding between two points.
///
/// Driving goes through Kakao Mobility and is passed through as-is;
/// `mode: "TRANSIT"` switches to Google Directions. Provider failures come
/// back as 502 with the provider's own payload attached.
#[utoipa::path(
    post,
    path = "/v1/route",
    tag = "route",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Provider route payload", body = Value),
        (status = 400, description = "Invalid coordinates"),
        (status = 502, description = "Route provider failed"),
    )
)]
pub async fn post_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<Value>, ServerError> {
    let origin = to_coordinate(req.origin)?;
    let destination = to_coordinate(req.destination)?;

    if req.mode.as_deref() == Some("TRANSIT") {
        let payload = state
            .directions
            .transit(origin, destination)
            .await
            .map_err(upstream)?;
        return Ok(Json(payload));
    }

    let waypoints: Vec<Coordinate> = req
        .waypoints
        .iter()
        .map(|p| to_coordinate(*p))
        .collect::<Result<_, _>>()?;
    let priority = req
        .priority
        .as_deref()
        .filter(|p| PRIORITIES.contains(p))
        .unwrap_or("RECOMMEND");
    let payload = state
        .directions
        .driving(origin, destination, &waypoints, priority)
        .await
        .map_err(upstream)?;
    Ok(Json(payload))
}

fn to_coordinate(p: RoutePoint) -> Result<Coordinate, ServerError> {
    let c = Coordinate::new(p.x, p.y);
    if !c.is_valid() {
        return Err(ServerError::BadRequest(format!(
            "invalid coordinate ({}, {})",
            p.x, p.y
        )));
    }
    Ok(c)
}

fn upstream(err: RouteError) -> ServerError {
    match err {
        RouteError::TransitFailed {
            status,
            error_message,
            raw,
        } => ServerError::Upstream(json!({
            "error": "경로를 찾을 수 없습니다.",
            "provider": "google",
            "status": status,
            "error_message": error_message,
            "raw": raw,
        })),
        other => ServerError::Upstream(json!({ "error": other.to_string() })),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
