//! Health and infrastructure handlers.

use axum::{extract::State, http::header, response::Json};
use serde::Serialize;

use super::router::AppState;
use crate::errors::AppError;
use crate::metrics;

/// Health response for the main health endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub users_count: i64,
}

/// GET /health - main health check
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let users_count = state.store.session().count_users()?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        users_count,
    }))
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_endpoint() -> ([(header::HeaderName, &'static str); 1], String) {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather(),
    )
}
