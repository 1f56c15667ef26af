//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use skycache_core::service::LookupConfig;
#[cfg(feature = "redis")]
use skycache_infra::RedisConfig;
use skycache_infra::{ProviderConfig, RateLimitConfig};

/// Which store backs the weather cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

impl CacheBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "memory" => CacheBackend::Memory,
            "none" | "off" | "disabled" => CacheBackend::Disabled,
            _ => CacheBackend::Redis,
        }
    }
}

/// Where rate limit counters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitBackend {
    Memory,
    Redis,
}

impl RateLimitBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "redis" => RateLimitBackend::Redis,
            _ => RateLimitBackend::Memory,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Identify clients by `Forwarded`/`X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
    pub cache_backend: CacheBackend,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    pub lookup: LookupConfig,
    pub provider: ProviderConfig,
    pub rate_limit_backend: RateLimitBackend,
    pub rate_limits: RateLimitConfig,
    pub rate_limit_key_prefix: String,
    /// How often in-memory limiter and cache state is pruned.
    pub maintenance_interval: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            trust_forwarded_for: env::var("TRUST_FORWARDED_FOR")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            cache_backend: env::var("CACHE_BACKEND")
                .map(|v| CacheBackend::parse(&v))
                .unwrap_or(CacheBackend::Redis),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            lookup: LookupConfig::from_env(),
            provider: ProviderConfig::from_env(),
            rate_limit_backend: env::var("RATE_LIMIT_BACKEND")
                .map(|v| RateLimitBackend::parse(&v))
                .unwrap_or(RateLimitBackend::Memory),
            rate_limits: RateLimitConfig::from_env(),
            rate_limit_key_prefix: env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
            maintenance_interval: Duration::from_secs(
                env::var("MAINTENANCE_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(300),
            ),
        }
    }
}
