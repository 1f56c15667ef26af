//! Rate limiting implementations.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig, RateWindow};

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisRateLimitConfig, RedisRateLimiter};
