//! Periodic pruning of in-memory limiter and cache state.

use std::sync::Arc;
use std::time::Duration;

use skycache_infra::{InMemoryCache, InMemoryRateLimiter};
use tokio::task::JoinHandle;

/// Housekeeping for the in-process adapters.
///
/// Redis-backed adapters expire their own keys and are never registered here.
pub struct Maintenance {
    interval: Duration,
    limiter: Option<Arc<InMemoryRateLimiter>>,
    cache: Option<Arc<InMemoryCache>>,
}

impl Maintenance {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            limiter: None,
            cache: None,
        }
    }

    pub fn track_limiter(&mut self, limiter: Arc<InMemoryRateLimiter>) {
        self.limiter = Some(limiter);
    }

    pub fn track_cache(&mut self, cache: Arc<InMemoryCache>) {
        self.cache = Some(cache);
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_none() && self.cache.is_none()
    }

    /// Run a single pass.
    pub async fn run_once(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.prune();
            tracing::debug!(
                tracked_clients = limiter.tracked_clients(),
                "Pruned rate limiter state"
            );
        }

        if let Some(cache) = &self.cache {
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired cache entries");
            }
        }
    }

    /// Start the periodic task. Returns `None` when there is nothing to maintain.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        if self.is_empty() {
            return None;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Maintenance task started");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycache_core::ports::{Cache, RateLimiter};
    use skycache_infra::RateLimitConfig;

    #[tokio::test]
    async fn test_run_once_purges_expired_entries() {
        let cache = Arc::new(InMemoryCache::new());
        cache
            .set("weather:oslo", "{}", Duration::from_millis(10))
            .await
            .unwrap();

        let limiter = Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default()).unwrap());
        limiter.admit("client").await.unwrap();

        let mut maintenance = Maintenance::new(Duration::from_secs(60));
        maintenance.track_cache(cache.clone());
        maintenance.track_limiter(limiter.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        maintenance.run_once().await;

        assert_eq!(cache.purge_expired().await, 0);
        assert_eq!(cache.get("weather:oslo").await, None);
    }

    #[test]
    fn test_nothing_to_maintain() {
        let maintenance = Maintenance::new(Duration::from_secs(60));
        assert!(maintenance.is_empty());
        assert!(maintenance.spawn().is_none());
    }
}
