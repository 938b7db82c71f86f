//! Unified provider error type.
//!
//! Callers in the conversation layer treat every variant the same way: log
//! it and fall back to a heuristic answer. The variants exist so the logs
//! say which provider failed and how.

use thiserror::Error;

/// Errors raised by the external provider clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure: connect, timeout, TLS, body read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The environment variable holding this provider's key is unset.
    #[error("{0} API key not configured")]
    MissingKey(&'static str),

    /// The provider answered 2xx but the payload was not usable.
    #[error("{provider} returned an unusable payload: {detail}")]
    Payload { provider: &'static str, detail: String },

    /// The provider reported an application-level error.
    #[error("{provider} error: {detail}")]
    Upstream { provider: &'static str, detail: String },
}
