//! Weather lookup endpoint.

use actix_web::{HttpResponse, web};
use skycache_core::LookupResult;
use skycache_core::service::CacheWrite;
use skycache_shared::WeatherResponse;
use tracing_actix_web::RequestId;

use crate::middleware::{AppError, AppResult, ClientId};
use crate::state::AppState;

const CACHE_WRITE_WARNING: &str = "Result could not be cached";

/// GET /weather/{key}
pub async fn get_weather(
    state: web::Data<AppState>,
    key: web::Path<String>,
    client: ClientId,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let key = key.into_inner();
    let result = state.lookup.lookup(&key, client.as_str()).await;

    let source = result.source();
    let (data, cached, warning) = match result {
        LookupResult::Hit(record) => (record, Some(true), None),
        LookupResult::MissFetched { record, write } => match write {
            CacheWrite::Stored => (record, Some(true), None),
            CacheWrite::Skipped => (record, None, None),
            CacheWrite::Failed => (record, Some(false), Some(CACHE_WRITE_WARNING.to_string())),
        },
        LookupResult::Failed(error) => {
            return Err(AppError::lookup(error, request_id.to_string()));
        }
    };

    Ok(HttpResponse::Ok().json(WeatherResponse {
        city: key,
        data,
        source: source.map(|s| s.as_str()).unwrap_or_default().to_string(),
        cached,
        warning,
    }))
}
