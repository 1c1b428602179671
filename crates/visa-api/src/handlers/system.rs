//! Operational endpoints and the unknown-route fallback.

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::envelope::Envelope;
use crate::AppState;

/// Liveness probe.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Server is up")))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.db.backend(),
    }))
}

/// Connectivity check used by the web client.
#[utoipa::path(get, path = "/api/test", tag = "System",
    responses((status = 200, description = "API is running")))]
pub async fn api_test() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Visa tracker API is running!",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure(format!(
            "Route {} {} not found!",
            method, path
        ))),
    )
}
