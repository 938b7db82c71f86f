//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use gil_agent::Agent;
use gil_providers::directions::Directions;

use crate::config::Config;
use crate::entities::AnyStore;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent conversation / schedule store.
    pub store: Arc<AnyStore>,
    /// The conversation orchestrator with its provider clients.
    pub agent: Arc<Agent>,
    /// Route-finding providers (Kakao driving, Google transit).
    pub directions: Directions,
}
