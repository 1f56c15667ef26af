use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - abstraction over caching backends (Redis, in-memory).
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache.
    ///
    /// Backend failures are reported as a miss, never as an error.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Round-trip to the backend.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Liveness probe.
    async fn is_available(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Cache liveness probe failed");
                false
            }
        }
    }
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation failed: {0}")]
    Operation(String),
}
