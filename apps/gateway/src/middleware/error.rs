//! Error handling - maps lookup failures to HTTP responses.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use skycache_core::{ErrorKind, LookupError};
use skycache_core::ports::UpstreamError;
use skycache_shared::ErrorResponse;

/// Application-level error type that converts to structured JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{error}")]
    Lookup {
        error: LookupError,
        request_id: Option<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn lookup(error: LookupError, request_id: impl Into<String>) -> Self {
        AppError::Lookup {
            error,
            request_id: Some(request_id.into()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(error: LookupError) -> Self {
        AppError::Lookup {
            error,
            request_id: None,
        }
    }
}

/// HTTP status for a lookup failure.
pub fn status_for(error: &LookupError) -> StatusCode {
    match error {
        LookupError::Validation(_) => StatusCode::BAD_REQUEST,
        LookupError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        LookupError::Upstream(upstream) => match upstream {
            UpstreamError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            UpstreamError::InvalidKey | UpstreamError::NoData => StatusCode::NOT_FOUND,
            // The provider's own quota is exhausted; the gateway is unavailable until it resets.
            UpstreamError::ProviderFailure { status: 429, .. } => StatusCode::SERVICE_UNAVAILABLE,
            UpstreamError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::AuthFailed
            | UpstreamError::ProviderFailure { .. }
            | UpstreamError::Transport(_)
            | UpstreamError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        },
    }
}

fn title_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "Invalid Location Code",
        ErrorKind::RateLimited => "Too Many Requests",
        ErrorKind::Config => "Service Misconfigured",
        ErrorKind::InvalidKey => "Location Not Found",
        ErrorKind::NoData => "No Weather Data",
        ErrorKind::AuthFailed => "Upstream Authentication Failed",
        ErrorKind::ProviderFailure => "Upstream Provider Error",
        ErrorKind::Timeout => "Upstream Timeout",
        ErrorKind::Transport => "Upstream Unreachable",
        ErrorKind::InvalidResponse => "Invalid Upstream Response",
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Lookup { error, .. } => status_for(error),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let (error, request_id) = match self {
            AppError::NotFound(path) => {
                return HttpResponse::build(status)
                    .json(ErrorResponse::not_found(format!("No route for {path}")));
            }
            AppError::Lookup { error, request_id } => (error, request_id),
        };

        let kind = error.kind();
        match kind {
            // Operator-actionable: the gateway itself is misconfigured.
            ErrorKind::Config | ErrorKind::AuthFailed => {
                tracing::error!(kind = %kind, error = %error, "Lookup failed")
            }
            _ if status.is_server_error() => {
                tracing::warn!(kind = %kind, error = %error, "Lookup failed")
            }
            _ => tracing::debug!(kind = %kind, error = %error, "Lookup rejected"),
        }

        let mut body = ErrorResponse::new(status.as_u16(), title_for(kind), kind.as_str())
            .with_details(error.to_string());
        if let Some(id) = request_id {
            body = body.with_request_id(id.as_str());
        }

        let mut response = HttpResponse::build(status);
        if let LookupError::RateLimited { retry_after } = error {
            let seconds = retry_after.as_secs().max(1);
            body = body.with_retry_after(seconds);
            response.insert_header((header::RETRY_AFTER, seconds.to_string()));
        }

        response.json(body)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn upstream(error: UpstreamError) -> LookupError {
        LookupError::Upstream(error)
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LookupError::Validation("empty".into()), 400),
            (
                LookupError::RateLimited {
                    retry_after: Duration::from_secs(5),
                },
                429,
            ),
            (upstream(UpstreamError::MissingCredential), 500),
            (upstream(UpstreamError::InvalidKey), 404),
            (upstream(UpstreamError::NoData), 404),
            (upstream(UpstreamError::AuthFailed), 502),
            (
                upstream(UpstreamError::ProviderFailure {
                    status: 429,
                    message: "quota".into(),
                }),
                503,
            ),
            (
                upstream(UpstreamError::ProviderFailure {
                    status: 500,
                    message: "boom".into(),
                }),
                502,
            ),
            (upstream(UpstreamError::Timeout), 504),
            (upstream(UpstreamError::Transport("refused".into())), 502),
            (upstream(UpstreamError::InvalidResponse("eof".into())), 502),
        ];

        for (error, expected) in cases {
            assert_eq!(status_for(&error).as_u16(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_rate_limited_response_sets_retry_after() {
        let error = AppError::lookup(
            LookupError::RateLimited {
                retry_after: Duration::from_secs(12),
            },
            "req-7",
        );

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("12")
        );
    }
}
