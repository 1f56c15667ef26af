//! Visual Crossing timeline API client.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use skycache_core::domain::{LookupKey, Reading, WeatherRecord, text_or_sentinel};
use skycache_core::ports::{UpstreamError, WeatherProvider};

/// Production timeline endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Longest provider error text carried into an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Provider connection configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Timeline endpoint; the location code is appended as a path segment.
    pub base_url: String,
    /// API key. `None` means every fetch fails without a network call.
    pub api_key: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("WEATHER_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("WEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(
                std::env::var("WEATHER_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Errors building the provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderInitError {
    #[error("Invalid provider base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP client for the Visual Crossing timeline API.
pub struct VisualCrossingClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl VisualCrossingClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderInitError> {
        let invalid = |reason: String| ProviderInitError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason,
        };

        let base_url = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot have path segments".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("skycache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    fn location_url(&self, key: &LookupKey) -> Url {
        let mut url = self.base_url.clone();
        // Infallible: cannot-be-a-base URLs are rejected in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key.as_str());
        }
        url
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingClient {
    async fn fetch(&self, key: &LookupKey) -> Result<WeatherRecord, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)?;

        let started = Instant::now();
        let response = self
            .client
            .get(self.location_url(key))
            .query(&[("key", api_key), ("unitGroup", "metric")])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        tracing::debug!(
            key = %key,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Provider responded"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(classify_transport)?;
        parse_timeline(&body)
    }
}

/// The request URL carries the API key, so it is stripped from error text.
fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.without_url().to_string())
    }
}

fn classify_status(status: u16, body: &str) -> UpstreamError {
    match status {
        400 => UpstreamError::InvalidKey,
        401 => UpstreamError::AuthFailed,
        _ => UpstreamError::ProviderFailure {
            status,
            message: error_message(body).unwrap_or_else(|| format!("HTTP {status}")),
        },
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Best-effort extraction of the provider's explanation from an error body.
fn error_message(body: &str) -> Option<String> {
    let text = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error)?,
        Err(_) => body.to_string(),
    };

    let text = text.trim();
    if text.is_empty() || text.starts_with('<') {
        return None;
    }
    Some(text.chars().take(MAX_ERROR_MESSAGE_LEN).collect())
}

#[derive(Deserialize)]
struct Timeline {
    #[serde(rename = "resolvedAddress")]
    resolved_address: Option<String>,
    days: Option<Vec<TimelineDay>>,
}

#[derive(Deserialize)]
struct TimelineDay {
    temp: Option<f64>,
    conditions: Option<String>,
    description: Option<String>,
    humidity: Option<f64>,
    windspeed: Option<f64>,
    datetime: Option<String>,
}

/// Normalize a successful timeline body into a record.
fn parse_timeline(body: &str) -> Result<WeatherRecord, UpstreamError> {
    let timeline: Timeline =
        serde_json::from_str(body).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

    let day = timeline
        .days
        .and_then(|days| days.into_iter().next())
        .ok_or(UpstreamError::NoData)?;

    Ok(WeatherRecord {
        temperature: Reading::from(day.temp),
        conditions: text_or_sentinel(day.conditions),
        description: day.description.unwrap_or_default(),
        humidity: Reading::from(day.humidity),
        wind_speed: Reading::from(day.windspeed),
        location: text_or_sentinel(timeline.resolved_address),
        last_updated: text_or_sentinel(day.datetime),
    })
}
