//! HTTP handlers and route configuration.

mod health;
mod index;
mod weather;

use actix_web::{HttpRequest, web};

use crate::middleware::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::service_info))
        .route("/health", web::get().to(health::health_check))
        // An empty segment still reaches the handler so it is rejected as invalid.
        .route("/weather/{key:[^/]*}", web::get().to(weather::get_weather));
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound(req.path().to_string()))
}

#[cfg(test)]
mod tests;
