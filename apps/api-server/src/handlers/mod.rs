//! HTTP handlers and route configuration.

mod health;
mod organizations;

use actix_web::web;

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Ungoverned
            .route("/health", web::get().to(health::health_check))
            // Governed listing
            .service(
                web::resource("/organizations")
                    .route(web::get().to(organizations::list))
                    .route(web::method(actix_web::http::Method::OPTIONS).to(organizations::preflight)),
            ),
    );
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppResult<actix_web::HttpResponse> {
    Err(AppError::NotFound)
}
