// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::local_stats::LocalStatsProbe;
use crate::service::DashboardService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<DashboardService>,
    pub(crate) local_stats: Arc<LocalStatsProbe>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    service: Arc<DashboardService>,
    local_stats: Arc<LocalStatsProbe>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        service,
        local_stats,
        ws_connections,
    };
    Router::new()
        .route("/version", get(http::version_handler))
        .route("/api/dashboard", get(http::dashboard_handler))
        .route("/api/refresh", post(http::refresh_handler))
        .route("/api/cards", get(http::cards_handler))
        .route("/api/cards/{key}", put(http::set_card_handler))
        .route("/api/cards/{key}/toggle", post(http::toggle_card_handler))
        .route(
            "/api/activity-filter",
            get(http::get_activity_filter_handler).put(http::set_activity_filter_handler),
        )
        .route("/api/notifications", get(http::notifications_handler))
        .route(
            "/api/notifications/read-all",
            post(http::mark_all_read_handler),
        )
        .route(
            "/api/notifications/{id}/target",
            get(http::notification_target_handler),
        )
        .route("/api/stats", get(http::host_stats_handler))
        .route("/ws/dashboard", get(ws::ws_dashboard))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
