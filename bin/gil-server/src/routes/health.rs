//! Liveness endpoint.
//!
//! Deliberately storage-free: the probe answers as long as the process is
//! up. Provider outages already degrade to fallback replies instead of
//! failures, so "up" is the only state worth reporting here.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness probe for load-balancers and monitoring.
///
/// Always HTTP 200, with the service name and crate version so a fleet
/// dashboard can tell which build answered.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status":  "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn probe_reports_ok() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn probe_identifies_the_build() {
        let Json(body) = get_health().await;
        assert_eq!(body["service"], "gil-server");
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
    }
}
