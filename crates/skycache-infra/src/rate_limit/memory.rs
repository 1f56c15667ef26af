//! In-memory per-client rate limiter using fixed window counters.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use skycache_core::ports::{RateLimitDecision, RateLimitError, RateLimiter};

/// A request budget over one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl RateWindow {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }

    pub fn per_hour(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RateLimitError> {
        if self.max_requests == 0 {
            return Err(RateLimitError::InvalidQuota(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(RateLimitError::InvalidQuota(
                "window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-client budgets: a short and a long window, both enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub short: RateWindow,
    pub long: RateWindow,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            short: RateWindow::per_minute(10),
            long: RateWindow::per_hour(100),
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            short: RateWindow::per_minute(
                std::env::var("RATE_LIMIT_PER_MINUTE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.short.max_requests),
            ),
            long: RateWindow::per_hour(
                std::env::var("RATE_LIMIT_PER_HOUR")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.long.max_requests),
            ),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RateLimitError> {
        self.short.validate()?;
        self.long.validate()
    }
}

/// Round a wait up to whole seconds, never below one.
pub(crate) fn retry_hint(wait: Duration) -> Duration {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    Duration::from_secs(secs.max(1))
}

/// One client's counter in one window.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    started: Instant,
    count: u32,
}

impl WindowCounter {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }

    fn is_expired(&self, window: &RateWindow, now: Instant) -> bool {
        now.duration_since(self.started) >= window.window
    }

    /// Start a fresh window if the current one has ended.
    fn roll(&mut self, window: &RateWindow, now: Instant) {
        if self.is_expired(window, now) {
            *self = Self::new(now);
        }
    }

    /// Time until this window resets, if its budget is spent.
    fn exhausted_wait(&self, window: &RateWindow, now: Instant) -> Option<Duration> {
        (self.count >= window.max_requests)
            .then(|| window.window.saturating_sub(now.duration_since(self.started)))
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindows {
    short: WindowCounter,
    long: WindowCounter,
}

/// In-memory rate limiter keyed by client.
///
/// Each window is a counter that starts at a client's first request and
/// resets once the window has elapsed, the same scheme as the Redis limiter.
/// Limits are per-process and reset on restart. A denied request spends
/// nothing from either window.
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    clients: DashMap<String, ClientWindows>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        config.validate()?;
        Ok(Self {
            config,
            clients: DashMap::new(),
        })
    }

    /// Forget clients whose windows have all ended.
    pub fn prune(&self) {
        let now = Instant::now();
        let RateLimitConfig { short, long } = self.config;
        self.clients.retain(|_, windows| {
            !(windows.short.is_expired(&short, now) && windows.long.is_expired(&long, now))
        });
        self.clients.shrink_to_fit();
    }

    /// Number of clients with live window state.
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    fn check(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let RateLimitConfig { short, long } = self.config;

        // The entry guard holds the shard lock, so check-and-count is atomic per client.
        let mut entry = self
            .clients
            .entry(client_id.to_string())
            .or_insert_with(|| ClientWindows {
                short: WindowCounter::new(now),
                long: WindowCounter::new(now),
            });
        let windows = entry.value_mut();
        windows.short.roll(&short, now);
        windows.long.roll(&long, now);

        let wait = [
            windows.short.exhausted_wait(&short, now),
            windows.long.exhausted_wait(&long, now),
        ]
        .into_iter()
        .flatten()
        .max();

        if let Some(wait) = wait {
            return RateLimitDecision::Denied {
                retry_after: retry_hint(wait),
            };
        }

        windows.short.count += 1;
        windows.long.count += 1;

        RateLimitDecision::Allowed {
            remaining: (short.max_requests - windows.short.count)
                .min(long.max_requests - windows.long.count),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn admit(&self, client_id: &str) -> Result<RateLimitDecision, RateLimitError> {
        Ok(self.check(client_id, Instant::now()))
    }
}
