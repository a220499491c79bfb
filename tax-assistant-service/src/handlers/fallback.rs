use axum::{http::StatusCode, http::Uri, response::IntoResponse, Json};
use serde_json::json;

use super::AVAILABLE_ROUTES;

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
            "availableRoutes": AVAILABLE_ROUTES
        })),
    )
}
