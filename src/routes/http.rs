// GET/POST handlers: version, snapshot, refresh, notifications, stats

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::models::SnapshotDisplay;

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/snapshot: latest snapshot with display values, 503 until the first cycle lands.
pub(super) async fn snapshot_handler(State(state): State<AppState>) -> Response {
    match state.aggregator.latest() {
        Some(snapshot) => Json(SnapshotDisplay::from(snapshot.as_ref())).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "pending" })),
        )
            .into_response(),
    }
}

/// POST /api/refresh: queue an out-of-band cycle; the result arrives via /api/snapshot or WS.
pub(super) async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.aggregator.trigger_now();
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "queued" })),
    )
}

pub(super) async fn notifications_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.notices.notices())
}

pub(super) async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.stats())
}
