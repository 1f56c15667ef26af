//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - abstraction over rate limiting backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request from `client_id` and decide whether it may proceed.
    async fn admit(&self, client_id: &str) -> Result<RateLimitDecision, RateLimitError>;
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted. `remaining` is the approximate budget left in the
    /// tightest window.
    Allowed { remaining: u32 },
    /// Budget exhausted; the client may retry after the hint.
    Denied { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid quota: {0}")]
    InvalidQuota(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
