//! Standardized error payload.

use serde::{Deserialize, Serialize};

/// Structured error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A short, human-readable summary.
    pub error: String,

    /// Machine-readable failure category (e.g. `invalid_key`).
    pub kind: String,

    /// The HTTP status code.
    pub status: u16,

    /// Diagnostic text specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Seconds to wait before retrying, for rate limited requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,

    /// Request ID for debugging purposes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.into(),
            status,
            details: None,
            retry_after: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(404, "Not Found", "not_found").with_details(details)
    }
}
