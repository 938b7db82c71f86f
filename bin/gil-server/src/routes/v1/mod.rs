pub mod chat;
pub mod route;
pub mod schedule;
pub mod session;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

/// Routes nested under `/v1`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::router())
        .merge(session::router())
        .merge(schedule::router())
        .merge(route::router())
}

#[derive(OpenApi)]
#[openapi()]
pub struct V1Api;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = V1Api::openapi();
    spec.merge(chat::ChatApi::openapi());
    spec.merge(session::SessionApi::openapi());
    spec.merge(schedule::ScheduleApi::openapi());
    spec.merge(route::RouteApi::openapi());
    spec
}
