//! Application services composed from the ports.

mod health;
mod lookup;

pub use health::{HealthReporter, HealthStatus};
pub use lookup::{
    CacheWrite, DEFAULT_CACHE_TTL, DEFAULT_KEY_PREFIX, LookupConfig, LookupResult, Source,
    WeatherLookup,
};
