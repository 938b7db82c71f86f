//! Shared HTTP client construction.

use std::time::Duration;

use crate::error::ProviderError;

/// Default per-call timeout in seconds. Provider calls are best-effort and
/// must not stall a chat turn.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Build the `reqwest` client every provider call goes through.
pub fn build(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        assert!(build(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).is_ok());
    }
}
