//! Upstream weather provider port.

use async_trait::async_trait;

use crate::domain::{LookupKey, WeatherRecord};

/// A third-party source of weather data.
///
/// Implementations make exactly one bounded-time attempt per call and
/// classify every failure; retries are never performed here.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, key: &LookupKey) -> Result<WeatherRecord, UpstreamError>;
}

/// Classified upstream failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Weather API key is not configured")]
    MissingCredential,

    #[error("Unknown or invalid location code")]
    InvalidKey,

    #[error("Provider rejected the API key")]
    AuthFailed,

    #[error("Provider has no data for this location")]
    NoData,

    #[error("Provider returned HTTP {status}: {message}")]
    ProviderFailure { status: u16, message: String },

    #[error("Provider did not respond within the timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}
