//! Health check endpoint.

use actix_web::{HttpResponse, web};

use quill_shared::HealthResponse;

use crate::state::AppState;

/// Liveness report with the active storage backend.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
