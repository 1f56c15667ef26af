//! Redis rate limiter using fixed window counters.

use std::time::Duration;

use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;

use skycache_core::ports::{RateLimitDecision, RateLimitError, RateLimiter};

use super::memory::{RateLimitConfig, RateWindow, retry_hint};
use crate::cache::RedisConfig;

/// Redis rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    /// Redis connection config
    pub redis: RedisConfig,
    /// Per-client budgets
    pub limits: RateLimitConfig,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl Default for RedisRateLimitConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            limits: RateLimitConfig::default(),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

/// Redis-backed rate limiter, shared by every gateway instance.
///
/// Each window is a counter that starts at a client's first request and
/// expires with the window, so a burst can straddle two windows.
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    config: RedisRateLimitConfig,
    /// Lua script for atomic increment with expiry of both windows
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, RateLimitError> {
        config.limits.validate()?;
        for window in [config.limits.short, config.limits.long] {
            // Key expiry has whole-second resolution.
            if window.window.as_secs() == 0 {
                return Err(RateLimitError::InvalidQuota(format!(
                    "window {:?} is shorter than one second",
                    window.window
                )));
            }
        }

        let conn = config
            .redis
            .connect()
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Returns: [short_count, short_ttl, long_count, long_ttl]
        let script = Script::new(
            r#"
            local result = {}
            for i, key in ipairs(KEYS) do
                local current = redis.call('INCR', key)
                if current == 1 then
                    redis.call('EXPIRE', key, tonumber(ARGV[i]))
                end
                table.insert(result, current)
                table.insert(result, redis.call('TTL', key))
            end
            return result
            "#,
        );

        tracing::info!(url = %config.redis.url, "Connected to Redis rate limiter");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    fn make_key(&self, client_id: &str, window: &RateWindow) -> String {
        format!(
            "{}:{}:{}",
            self.config.key_prefix,
            client_id,
            window.window.as_secs()
        )
    }
}

/// Count and TTL for one window as returned by the script.
fn window_state(result: &[i64], index: usize, window: &RateWindow) -> (u32, Duration) {
    let count = result.get(index * 2).copied().unwrap_or(1).max(0) as u32;
    let ttl = result
        .get(index * 2 + 1)
        .copied()
        .filter(|ttl| *ttl > 0)
        .map(|ttl| Duration::from_secs(ttl as u64))
        .unwrap_or(window.window);
    (count, ttl)
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn admit(&self, client_id: &str) -> Result<RateLimitDecision, RateLimitError> {
        let limits = self.config.limits;
        let mut conn = self.conn.clone();

        let result: Vec<i64> = self
            .script
            .key(self.make_key(client_id, &limits.short))
            .key(self.make_key(client_id, &limits.long))
            .arg(limits.short.window.as_secs())
            .arg(limits.long.window.as_secs())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let mut remaining = u32::MAX;
        let mut retry_after: Option<Duration> = None;

        for (index, window) in [limits.short, limits.long].iter().enumerate() {
            let (count, ttl) = window_state(&result, index, window);
            if count > window.max_requests {
                retry_after = Some(retry_after.map_or(ttl, |current| current.max(ttl)));
            } else {
                remaining = remaining.min(window.max_requests - count);
            }
        }

        Ok(match retry_after {
            Some(wait) => RateLimitDecision::Denied {
                retry_after: retry_hint(wait),
            },
            None => RateLimitDecision::Allowed { remaining },
        })
    }
}
