//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod provider;
mod rate_limit;

pub use cache::{Cache, CacheError};
pub use provider::{UpstreamError, WeatherProvider};
pub use rate_limit::{RateLimitDecision, RateLimitError, RateLimiter};
