//! Redis cache implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};

use skycache_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Upper bound for a single command round-trip
    pub op_timeout: Duration,
    /// Whether to fall back to the in-memory cache if Redis is unavailable
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            op_timeout: Duration::from_millis(500),
            fallback_to_memory: false,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            op_timeout: Duration::from_millis(
                std::env::var("REDIS_OP_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Connect with the configured timeout.
    pub(crate) async fn connect(&self) -> Result<ConnectionManager, CacheError> {
        let client =
            Client::open(self.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        tokio::time::timeout(self.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(self.connect_timeout))?
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

/// Redis-backed cache implementation.
///
/// The connection manager is multiplexed and reconnects on its own; it is
/// cloned per command.
pub struct RedisCache {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisCache {
    /// Connect and verify the server answers `PING`.
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let conn = config.connect().await?;
        let cache = Self { conn, config };
        cache.ping().await?;

        tracing::info!(url = %cache.config.url, "Connected to Redis cache");

        Ok(cache)
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = RedisResult<T>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.config.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.config.op_timeout))?
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match self.bounded(conn.get::<_, Option<String>>(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        self.bounded(conn.set_ex::<_, _, ()>(key, value, seconds))
            .await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let cmd = redis::cmd("PING");
        let pong: String = self.bounded(cmd.query_async(&mut conn)).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Operation(format!("unexpected PING reply: {pong}")))
        }
    }
}
