// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::{NoticeLog, TelemetryAggregator};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<TelemetryAggregator>,
    pub(crate) notices: Arc<NoticeLog>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(aggregator: Arc<TelemetryAggregator>, notices: Arc<NoticeLog>) -> Router {
    let state = AppState {
        aggregator,
        notices,
        ws_connections: Arc::new(AtomicUsize::new(0)),
    };
    Router::new()
        .route("/", get(|| async { "homestatus: local telemetry" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/snapshot", get(http::snapshot_handler)) // GET /api/snapshot
        .route("/api/refresh", post(http::refresh_handler)) // POST /api/refresh
        .route("/api/notifications", get(http::notifications_handler)) // GET /api/notifications
        .route("/api/stats", get(http::stats_handler)) // GET /api/stats
        .route("/ws/snapshot", get(ws::ws_snapshot)) // WS /ws/snapshot
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
