// HTTP handlers: dashboard view, refresh, cards, activity filter, notifications, host stats

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::notifications::ActivityFilter;
use crate::visibility::CardKey;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.view().await)
}

/// POST /api/refresh: resolves once every source has settled.
pub(super) async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.service.refresh_all().await;
    Json(state.service.view().await)
}

pub(super) async fn cards_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.visible_cards().await)
}

pub(super) async fn toggle_card_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Response {
    match key.parse::<CardKey>() {
        Ok(key) => Json(state.service.toggle_card(key).await).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct VisibleBody {
    visible: bool,
}

/// PUT /api/cards/{key}: sets one card's visibility explicitly.
pub(super) async fn set_card_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<VisibleBody>,
) -> Response {
    match key.parse::<CardKey>() {
        Ok(key) => Json(state.service.set_card_visible(key, body.visible).await).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FilterBody {
    filter: ActivityFilter,
}

pub(super) async fn get_activity_filter_handler(
    State(state): State<AppState>,
) -> impl IntoResponse {
    Json(serde_json::json!({ "filter": state.service.activity_filter().await }))
}

pub(super) async fn set_activity_filter_handler(
    State(state): State<AppState>,
    Json(body): Json<FilterBody>,
) -> impl IntoResponse {
    state.service.set_activity_filter(body.filter.clone()).await;
    Json(serde_json::json!({ "filter": body.filter }))
}

#[derive(Debug, Deserialize)]
pub(super) struct NotificationsQuery {
    filter: Option<ActivityFilter>,
}

/// GET /api/notifications?filter=: defaults to the active filter.
pub(super) async fn notifications_handler(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> impl IntoResponse {
    Json(state.service.notifications(query.filter).await)
}

/// POST /api/notifications/read-all: accepted and logged; no upstream mutation exists.
pub(super) async fn mark_all_read_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.service.mark_all_read().await;
    StatusCode::ACCEPTED
}

pub(super) async fn notification_target_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.service.navigation_target(&id).await {
        Some(target) => Json(serde_json::json!({
            "path": target.path(),
            "target": target,
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /api/stats: host cpu / memory / disk usage percentages.
pub(super) async fn host_stats_handler(State(state): State<AppState>) -> Response {
    match state.local_stats.sample().await {
        Ok(usage) => Json(usage).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "host_stats", "host stats failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
