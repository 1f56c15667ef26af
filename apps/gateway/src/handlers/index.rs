//! Service description endpoint.

use actix_web::HttpResponse;
use skycache_shared::ServiceInfo;

/// GET /
pub async fn service_info() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo {
        service: "SkyCache Weather Gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Cached, rate limited access to current weather by location code".to_string(),
        endpoints: vec![
            "GET /weather/{location}".to_string(),
            "GET /health".to_string(),
            "GET /".to_string(),
        ],
    })
}
