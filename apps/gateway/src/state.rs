//! Application state - shared across all handlers.

use std::sync::Arc;

use skycache_core::ports::{Cache, RateLimiter};
use skycache_core::{HealthReporter, WeatherLookup};
use skycache_infra::{InMemoryCache, InMemoryRateLimiter, VisualCrossingClient};

#[cfg(feature = "redis")]
use skycache_infra::{RedisCache, RedisRateLimitConfig, RedisRateLimiter};

use crate::background::Maintenance;
use crate::config::{AppConfig, CacheBackend, RateLimitBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<WeatherLookup>,
    pub health: HealthReporter,
    /// Identify clients by forwarding headers rather than the peer address.
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(lookup: WeatherLookup, health: HealthReporter, trust_forwarded_for: bool) -> Self {
        Self {
            lookup: Arc::new(lookup),
            health,
            trust_forwarded_for,
        }
    }

    /// Build the application state and the housekeeping for its in-memory parts.
    ///
    /// An unreachable cache store disables caching (or falls back to memory when
    /// configured); it never prevents startup. A bad rate limit budget or
    /// provider URL does.
    pub async fn build(config: &AppConfig) -> anyhow::Result<(Self, Maintenance)> {
        let mut maintenance = Maintenance::new(config.maintenance_interval);

        let cache = build_cache(config, &mut maintenance).await;
        let limiter = build_limiter(config, &mut maintenance).await?;

        if !config.provider.credential_configured() {
            tracing::warn!("WEATHER_API_KEY not set - every cache miss will fail");
        }
        let provider = Arc::new(VisualCrossingClient::new(config.provider.clone())?);

        let lookup = WeatherLookup::new(limiter, cache, provider, config.lookup.clone());
        let health = HealthReporter::new(
            lookup.cache_enabled(),
            config.provider.credential_configured(),
        );

        tracing::info!(
            cache_enabled = lookup.cache_enabled(),
            credential_configured = config.provider.credential_configured(),
            "Application state initialized"
        );

        Ok((
            Self::new(lookup, health, config.trust_forwarded_for),
            maintenance,
        ))
    }
}

fn memory_cache(maintenance: &mut Maintenance) -> Arc<dyn Cache> {
    let cache = Arc::new(InMemoryCache::new());
    maintenance.track_cache(cache.clone());
    cache
}

async fn build_cache(config: &AppConfig, maintenance: &mut Maintenance) -> Option<Arc<dyn Cache>> {
    match config.cache_backend {
        CacheBackend::Disabled => {
            tracing::info!("Caching disabled by configuration");
            None
        }
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache");
            Some(memory_cache(maintenance))
        }
        #[cfg(feature = "redis")]
        CacheBackend::Redis => match RedisCache::new(config.redis.clone()).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) if config.redis.fallback_to_memory => {
                tracing::warn!(error = %e, "Redis unavailable. Falling back to in-memory cache.");
                Some(memory_cache(maintenance))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable. Running with caching disabled.");
                None
            }
        },
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => {
            tracing::warn!("Built without the redis feature. Running with caching disabled.");
            None
        }
    }
}

async fn build_limiter(
    config: &AppConfig,
    maintenance: &mut Maintenance,
) -> anyhow::Result<Arc<dyn RateLimiter>> {
    #[cfg(feature = "redis")]
    if config.rate_limit_backend == RateLimitBackend::Redis {
        let redis_config = RedisRateLimitConfig {
            redis: config.redis.clone(),
            limits: config.rate_limits,
            key_prefix: config.rate_limit_key_prefix.clone(),
        };
        match RedisRateLimiter::new(redis_config).await {
            Ok(limiter) => return Ok(Arc::new(limiter)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to start Redis rate limiter. Using in-memory fallback."
                );
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    if config.rate_limit_backend == RateLimitBackend::Redis {
        tracing::warn!("Built without the redis feature - using in-memory rate limiter");
    }

    let limiter = Arc::new(InMemoryRateLimiter::new(config.rate_limits)?);
    maintenance.track_limiter(limiter.clone());
    Ok(limiter)
}
