//! Data Transfer Objects - response types for the API.

use serde::{Deserialize, Serialize};
use skycache_core::domain::WeatherRecord;

/// Response for `GET /weather/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    /// Location code as requested.
    pub city: String,
    pub data: WeatherRecord,
    /// `"cache"` or `"3rd-party API"`.
    pub source: String,
    /// Whether the record is now held in the cache; omitted when caching is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Response for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `"enabled"` or `"disabled"`.
    pub cache: String,
    /// `"configured"` or `"missing"`.
    pub api_key: String,
}

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<String>,
}
