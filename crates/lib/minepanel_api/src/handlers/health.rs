//! Liveness endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /health`: public liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: "minepanel-backend".to_string(),
        version: minepanel_core::version().to_string(),
    })
}
