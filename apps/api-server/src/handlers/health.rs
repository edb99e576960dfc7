//! Health check endpoint.

use actix_web::{HttpResponse, web};
use defender_shared::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - not rate limited.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        counter_store: state.counter_backend.to_string(),
    })
}
