// Dashboard service: owns state, visibility store and refresh coordinator; publishes views

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;

use crate::models::Notification;
use crate::notifications::{ActivityFilter, NavTarget, filter_notifications, navigation_target};
use crate::refresh::{RefreshCoordinator, RefreshReport, Sources};
use crate::sources::MetricsRequest;
use crate::state::{DashboardState, DashboardView};
use crate::visibility::{CardKey, VisibilityMap, VisibilityStore};

/// Rate limit for the "no receivers" log line.
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

pub struct DashboardService {
    state: Arc<RwLock<DashboardState>>,
    coordinator: RefreshCoordinator,
    visibility: VisibilityStore,
    updates: broadcast::Sender<DashboardView>,
    last_no_receivers_log: std::sync::Mutex<Option<Instant>>,
}

impl DashboardService {
    pub fn new(
        sources: Sources,
        metrics_request: MetricsRequest,
        visibility: VisibilityStore,
        updates: broadcast::Sender<DashboardView>,
    ) -> Self {
        let state = Arc::new(RwLock::new(DashboardState::default()));
        let coordinator = RefreshCoordinator::new(sources, metrics_request, state.clone());
        Self {
            state,
            coordinator,
            visibility,
            updates,
            last_no_receivers_log: std::sync::Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardView> {
        self.updates.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    pub async fn view(&self) -> DashboardView {
        let visible = self.visibility.current().await;
        let is_refreshing = self.coordinator.is_refreshing();
        self.state
            .read()
            .await
            .view(visible, is_refreshing, chrono::Utc::now())
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        let report = self.coordinator.refresh_all().await;
        self.publish().await;
        report
    }

    pub async fn poll_metrics(&self) {
        self.coordinator.poll_metrics().await;
        self.publish().await;
    }

    pub async fn visible_cards(&self) -> VisibilityMap {
        self.visibility.current().await
    }

    pub async fn toggle_card(&self, key: CardKey) -> VisibilityMap {
        let map = self.visibility.toggle(key).await;
        self.publish().await;
        map
    }

    pub async fn set_card_visible(&self, key: CardKey, visible: bool) -> VisibilityMap {
        let map = self.visibility.set(key, visible).await;
        self.publish().await;
        map
    }

    pub async fn activity_filter(&self) -> ActivityFilter {
        self.state.read().await.activity_filter.clone()
    }

    pub async fn set_activity_filter(&self, filter: ActivityFilter) {
        self.state.write().await.activity_filter = filter;
        self.publish().await;
    }

    /// Notifications matching `filter`, or the active filter when `None`.
    pub async fn notifications(&self, filter: Option<ActivityFilter>) -> Vec<Notification> {
        let state = self.state.read().await;
        let filter = filter.unwrap_or_else(|| state.activity_filter.clone());
        filter_notifications(state.notifications(), &filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn navigation_target(&self, notification_id: &str) -> Option<NavTarget> {
        self.state
            .read()
            .await
            .find_notification(notification_id)
            .and_then(navigation_target)
    }

    /// Mark-all-read has no upstream endpoint; nothing is mutated.
    pub async fn mark_all_read(&self) {
        let unread = crate::notifications::unread_count(self.state.read().await.notifications());
        tracing::info!(
            operation = "mark_all_read",
            unread,
            "mark all notifications as read requested"
        );
    }

    async fn publish(&self) {
        let view = self.view().await;
        if self.updates.send(view).is_err() {
            let should_log = match self.last_no_receivers_log.lock() {
                Ok(mut last) => {
                    let due = last.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                    if due {
                        *last = Some(Instant::now());
                    }
                    due
                }
                Err(_) => false,
            };
            if should_log {
                tracing::debug!(
                    operation = "publish_view",
                    "No active WebSocket clients; broadcast channel has no receivers"
                );
            }
        }
    }
}
