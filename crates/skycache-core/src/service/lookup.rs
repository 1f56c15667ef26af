//! Cache-aside weather lookup.
//!
//! Order of operations for a single lookup:
//!
//! 1. validate the key (no I/O on failure)
//! 2. admit the client through the rate limiter (no cache/provider on denial)
//! 3. read the cache, if enabled; unreadable entries count as a miss
//! 4. on a miss, fetch from the provider
//! 5. write the fresh record back, if enabled; a failed write is reported
//!    alongside the record, not instead of it
//!
//! Concurrent misses for the same key are not coalesced: each one calls the
//! provider. Entries expire after the configured TTL and are never deleted here.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{LookupKey, WeatherRecord};
use crate::error::LookupError;
use crate::ports::{Cache, RateLimitDecision, RateLimiter, WeatherProvider};

/// Default cache entry lifetime: 12 hours.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(43_200);

/// Default cache key namespace.
pub const DEFAULT_KEY_PREFIX: &str = "weather:";

/// Pipeline settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Lifetime of a written cache entry.
    pub cache_ttl: Duration,
    /// Prefix separating weather entries from other users of the store.
    pub key_prefix: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl LookupConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            cache_ttl: Duration::from_secs(
                std::env::var("CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_CACHE_TTL.as_secs()),
            ),
            key_prefix: std::env::var("CACHE_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string()),
        }
    }
}

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Upstream,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Upstream => "3rd-party API",
        }
    }
}

/// Outcome of writing a fetched record back to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Stored,
    /// Caching is disabled for this process.
    Skipped,
    Failed,
}

/// Result of one lookup. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Hit(WeatherRecord),
    MissFetched {
        record: WeatherRecord,
        write: CacheWrite,
    },
    Failed(LookupError),
}

impl LookupResult {
    pub fn source(&self) -> Option<Source> {
        match self {
            LookupResult::Hit(_) => Some(Source::Cache),
            LookupResult::MissFetched { .. } => Some(Source::Upstream),
            LookupResult::Failed(_) => None,
        }
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            LookupResult::Hit(record) | LookupResult::MissFetched { record, .. } => Some(record),
            LookupResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            LookupResult::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// The lookup pipeline. Sole writer of weather cache entries.
pub struct WeatherLookup {
    limiter: Arc<dyn RateLimiter>,
    /// `None` when the store was unavailable at startup.
    cache: Option<Arc<dyn Cache>>,
    provider: Arc<dyn WeatherProvider>,
    config: LookupConfig,
}

impl WeatherLookup {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        cache: Option<Arc<dyn Cache>>,
        provider: Arc<dyn WeatherProvider>,
        config: LookupConfig,
    ) -> Self {
        Self {
            limiter,
            cache,
            provider,
            config,
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Look up weather for `key` on behalf of `client_id`.
    pub async fn lookup(&self, key: &str, client_id: &str) -> LookupResult {
        let key = match LookupKey::parse(key) {
            Ok(key) => key,
            Err(e) => return LookupResult::Failed(e),
        };

        if let Err(e) = self.admit(client_id).await {
            return LookupResult::Failed(e);
        }

        let cache_key = key.namespaced(&self.config.key_prefix);

        if let Some(record) = self.read_cached(&cache_key).await {
            tracing::debug!(key = %key, "Cache hit");
            return LookupResult::Hit(record);
        }

        let record = match self.provider.fetch(&key).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Upstream lookup failed");
                return LookupResult::Failed(e.into());
            }
        };

        let write = self.write_back(&cache_key, &record).await;
        tracing::debug!(key = %key, ?write, "Fetched from provider");

        LookupResult::MissFetched { record, write }
    }

    async fn admit(&self, client_id: &str) -> Result<(), LookupError> {
        match self.limiter.admit(client_id).await {
            Ok(RateLimitDecision::Allowed { .. }) => Ok(()),
            Ok(RateLimitDecision::Denied { retry_after }) => {
                tracing::warn!(client = %client_id, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
                Err(LookupError::RateLimited { retry_after })
            }
            Err(e) => {
                // Fail open: a broken limiter backend must not take the service down.
                tracing::error!(client = %client_id, error = %e, "Rate limiter error, failing open");
                Ok(())
            }
        }
    }

    async fn read_cached(&self, cache_key: &str) -> Option<WeatherRecord> {
        let cache = self.cache.as_ref()?;
        let raw = cache.get(cache_key).await?;

        match WeatherRecord::from_json(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key = %cache_key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    async fn write_back(&self, cache_key: &str, record: &WeatherRecord) -> CacheWrite {
        let Some(cache) = self.cache.as_ref() else {
            return CacheWrite::Skipped;
        };

        let payload = match record.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %cache_key, error = %e, "Failed to serialize record for cache");
                return CacheWrite::Failed;
            }
        };

        match cache.set(cache_key, &payload, self.config.cache_ttl).await {
            Ok(()) => CacheWrite::Stored,
            Err(e) => {
                tracing::warn!(key = %cache_key, error = %e, "Cache write failed");
                CacheWrite::Failed
            }
        }
    }
}
