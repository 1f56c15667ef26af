//! Lookup-level error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::ports::UpstreamError;

/// Why a lookup did not produce a record.
///
/// Cache failures never appear here; they degrade to a miss or a skipped write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limit exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::Validation(_) => ErrorKind::Validation,
            LookupError::RateLimited { .. } => ErrorKind::RateLimited,
            LookupError::Upstream(e) => match e {
                UpstreamError::MissingCredential => ErrorKind::Config,
                UpstreamError::InvalidKey => ErrorKind::InvalidKey,
                UpstreamError::AuthFailed => ErrorKind::AuthFailed,
                UpstreamError::NoData => ErrorKind::NoData,
                UpstreamError::ProviderFailure { .. } => ErrorKind::ProviderFailure,
                UpstreamError::Timeout => ErrorKind::Timeout,
                UpstreamError::Transport(_) => ErrorKind::Transport,
                UpstreamError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            },
        }
    }

    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited
                | ErrorKind::Timeout
                | ErrorKind::Transport
                | ErrorKind::ProviderFailure
        )
    }
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    RateLimited,
    Config,
    InvalidKey,
    AuthFailed,
    NoData,
    ProviderFailure,
    Timeout,
    Transport,
    InvalidResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Config => "config_error",
            ErrorKind::InvalidKey => "invalid_key",
            ErrorKind::AuthFailed => "auth_failed",
            ErrorKind::NoData => "no_data",
            ErrorKind::ProviderFailure => "provider_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
