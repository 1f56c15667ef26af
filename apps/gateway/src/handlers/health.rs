//! Health check endpoint.

use actix_web::{HttpResponse, web};
use skycache_shared::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - reports dependency configuration without probing it.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = state.health.status();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        cache: if status.cache_enabled {
            "enabled"
        } else {
            "disabled"
        }
        .to_string(),
        api_key: if status.credential_configured {
            "configured"
        } else {
            "missing"
        }
        .to_string(),
    })
}
