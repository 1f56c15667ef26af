use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::Value;
use tracing_actix_web::TracingLogger;

use skycache_core::domain::{LookupKey, Reading, WeatherRecord};
use skycache_core::ports::{Cache, CacheError, UpstreamError, WeatherProvider};
use skycache_core::service::LookupConfig;
use skycache_core::{HealthReporter, WeatherLookup};
use skycache_infra::{InMemoryCache, InMemoryRateLimiter, RateLimitConfig, RateWindow};

use super::{configure_routes, not_found};
use crate::state::AppState;

/// Knows "oslo"; every other key is unknown to the provider.
#[derive(Default)]
struct StubProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn fetch(&self, key: &LookupKey) -> Result<WeatherRecord, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match key.as_str() {
            "oslo" => Ok(WeatherRecord {
                temperature: Reading::Value(4.5),
                conditions: "Rain".to_string(),
                description: "Light rain in the afternoon.".to_string(),
                humidity: Reading::Value(88.0),
                wind_speed: Reading::NotAvailable,
                location: "Oslo, Norway".to_string(),
                last_updated: "2026-10-19".to_string(),
            }),
            "slow" => Err(UpstreamError::Timeout),
            _ => Err(UpstreamError::InvalidKey),
        }
    }
}

/// A store that reads as empty and refuses every write.
struct ReadOnlyCache;

#[async_trait]
impl Cache for ReadOnlyCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Operation("READONLY".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

fn state_with(
    cache: Option<Arc<dyn Cache>>,
    limits: RateLimitConfig,
    provider: Arc<StubProvider>,
) -> AppState {
    let limiter = Arc::new(InMemoryRateLimiter::new(limits).unwrap());
    let lookup = WeatherLookup::new(limiter, cache, provider, LookupConfig::default());
    let health = HealthReporter::new(lookup.cache_enabled(), true);
    AppState::new(lookup, health, false)
}

fn default_state(provider: Arc<StubProvider>) -> AppState {
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
    state_with(Some(cache), RateLimitConfig::default(), provider)
}

fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([198, 51, 100, last_octet], 40000))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(TracingLogger::default())
                .app_data(web::Data::new($state))
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_miss_then_hit() {
    let provider = Arc::new(StubProvider::default());
    let app = app!(default_state(provider.clone()));

    let req = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["city"], "oslo");
    assert_eq!(body["source"], "3rd-party API");
    assert_eq!(body["cached"], true);
    assert_eq!(body["data"]["temperature"], 4.5);
    assert_eq!(body["data"]["wind_speed"], "N/A");

    let req = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(1))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "cache");
    assert_eq!(body["data"]["location"], "Oslo, Norway");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_unknown_location_is_not_found() {
    let app = app!(default_state(Arc::new(StubProvider::default())));

    let req = test::TestRequest::get()
        .uri("/weather/doesnotexist")
        .peer_addr(peer(2))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "invalid_key");
    assert_eq!(body["status"], 404);
    assert!(body["error"].is_string());
    assert!(body["request_id"].is_string());
}

#[actix_web::test]
async fn test_blank_key_is_rejected_without_fetch() {
    let provider = Arc::new(StubProvider::default());
    let app = app!(default_state(provider.clone()));

    for uri in ["/weather/%20%20", "/weather/"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .peer_addr(peer(3))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "validation_error");
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_eleventh_request_is_rate_limited() {
    let app = app!(default_state(Arc::new(StubProvider::default())));

    for _ in 0..10 {
        let req = test::TestRequest::get()
            .uri("/weather/oslo")
            .peer_addr(peer(4))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(4))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "rate_limited");
    assert!(body["retry_after"].as_u64().unwrap() >= 1);

    // A different client still has its full budget.
    let req = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(5))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_forwarded_header_ignored_unless_trusted() {
    let limits = RateLimitConfig {
        short: RateWindow::per_minute(1),
        long: RateWindow::per_hour(100),
    };
    let app = app!(state_with(None, limits, Arc::new(StubProvider::default())));

    let first = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(6))
        .insert_header(("X-Forwarded-For", "192.0.2.1"))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

    // Spoofing a new forwarded address does not buy a fresh budget.
    let second = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(6))
        .insert_header(("X-Forwarded-For", "192.0.2.2"))
        .to_request();
    assert_eq!(
        test::call_service(&app, second).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_trusted_forwarded_address_is_client_identity() {
    let limits = RateLimitConfig {
        short: RateWindow::per_minute(1),
        long: RateWindow::per_hour(100),
    };
    let limiter = Arc::new(InMemoryRateLimiter::new(limits).unwrap());
    let lookup = WeatherLookup::new(
        limiter,
        None,
        Arc::new(StubProvider::default()),
        LookupConfig::default(),
    );
    let health = HealthReporter::new(false, true);
    let app = app!(AppState::new(lookup, health, true));

    let forwarded = |addr: &'static str| {
        test::TestRequest::get()
            .uri("/weather/oslo")
            .peer_addr(peer(10))
            .insert_header(("X-Forwarded-For", addr))
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, forwarded("192.0.2.10")).await.status(),
        StatusCode::OK
    );
    // Same proxy peer, different forwarded client: its own budget.
    assert_eq!(
        test::call_service(&app, forwarded("192.0.2.11")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, forwarded("192.0.2.10")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_upstream_timeout_is_gateway_timeout() {
    let app = app!(default_state(Arc::new(StubProvider::default())));

    let req = test::TestRequest::get()
        .uri("/weather/slow")
        .peer_addr(peer(7))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[actix_web::test]
async fn test_disabled_cache_omits_cached_flag() {
    let provider = Arc::new(StubProvider::default());
    let app = app!(state_with(None, RateLimitConfig::default(), provider.clone()));

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/weather/oslo")
            .peer_addr(peer(8))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["source"], "3rd-party API");
        assert!(body.get("cached").is_none());
        assert!(body.get("warning").is_none());
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn test_failed_write_still_returns_record() {
    let cache: Arc<dyn Cache> = Arc::new(ReadOnlyCache);
    let app = app!(state_with(
        Some(cache),
        RateLimitConfig::default(),
        Arc::new(StubProvider::default())
    ));

    let req = test::TestRequest::get()
        .uri("/weather/oslo")
        .peer_addr(peer(9))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cached"], false);
    assert!(body["warning"].is_string());
    assert_eq!(body["data"]["conditions"], "Rain");
}

#[actix_web::test]
async fn test_health_reports_startup_state() {
    let app = app!(state_with(
        None,
        RateLimitConfig::default(),
        Arc::new(StubProvider::default())
    ));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        serde_json::json!({"status": "healthy", "cache": "disabled", "api_key": "configured"})
    );
}

#[actix_web::test]
async fn test_index_lists_endpoints() {
    let app = app!(default_state(Arc::new(StubProvider::default())));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"].as_array().map(Vec::len), Some(3));
}

#[actix_web::test]
async fn test_unknown_route_is_json_not_found() {
    let app = app!(default_state(Arc::new(StubProvider::default())));

    let req = test::TestRequest::get().uri("/forecast/oslo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "not_found");
}
