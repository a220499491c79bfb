use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use super::AVAILABLE_ROUTES;
use crate::models::iso_timestamp;
use crate::startup::AppState;

pub const SERVICE_NAME: &str = "tax-assistant-service";

/// Service banner listing the public endpoints.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Tax assistant API",
        "status": "running",
        "endpoints": AVAILABLE_ROUTES,
        "timestamp": iso_timestamp(Utc::now())
    }))
}

/// Liveness probe. Never depends on provider configuration.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": iso_timestamp(Utc::now()),
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Reports which model chat requests are routed to.
pub async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "ai": state.model(),
        "timestamp": iso_timestamp(Utc::now())
    }))
}
