//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn health_body(status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: "invoicing-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(health_body("healthy"))
}

/// Readiness check (includes database)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    // Check database connection
    sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(health_body("ready")))
}
