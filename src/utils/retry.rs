//! Unauthenticated fallback for requests that carried an API key.
//!
//! Borealis rejects stale or foreign API keys even on public resources, so a
//! request that fails authentication is repeated exactly once without the key.
//! There is no backoff and no further attempt.

use reqwest::StatusCode;

/// Which statuses trigger the single retry without the API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRetry {
    /// Retry after 401 only (search, metadata, file listing)
    OnUnauthorized,
    /// Retry after 401 or 403 (file access)
    OnUnauthorizedOrForbidden,
    /// Never retry
    Never,
}

impl AuthRetry {
    /// Whether a response with `status` should be retried without the key
    pub fn should_retry(&self, status: StatusCode) -> bool {
        match self {
            AuthRetry::OnUnauthorized => status == StatusCode::UNAUTHORIZED,
            AuthRetry::OnUnauthorizedOrForbidden => {
                status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
            }
            AuthRetry::Never => false,
        }
    }
}
