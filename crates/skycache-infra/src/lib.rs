//! # SkyCache Infrastructure
//!
//! Concrete implementations of the ports defined in `skycache-core`.
//! This crate contains the cache, rate limiting and upstream provider adapters.
//!
//! ## Feature Flags
//!
//! - `redis` (default) - Redis support for the cache and the rate limiter

pub mod cache;
pub mod provider;
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateWindow};

// Re-exports - Provider
pub use provider::{ProviderConfig, VisualCrossingClient};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "redis")]
pub use rate_limit::{RedisRateLimitConfig, RedisRateLimiter};
