// Dashboard state: per-source fetch status and the serializable view handed to clients

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::DashboardSummary;
use crate::format::{format_number, time_ago};
use crate::metrics::{MetricSample, NormalizedMetrics};
use crate::models::{Notification, Project};
use crate::notifications::{
    ActivityFilter, NotificationKind, filter_notifications, navigation_target, recent_activity,
    unread_count,
};
use crate::visibility::VisibilityMap;

/// Last known result of one source. `loading` stays true until the first fetch settles;
/// a failed re-fetch keeps the previously fetched data alongside the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for SourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

impl<T> SourceState<T> {
    pub fn settle(&mut self, result: Result<T, String>) {
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
        self.loading = false;
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub projects: SourceState<Vec<Project>>,
    pub notifications: SourceState<Vec<Notification>>,
    pub metrics: SourceState<NormalizedMetrics>,
    pub activity_filter: ActivityFilter,
}

/// Loading flag and error of one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> From<&SourceState<T>> for SectionStatus {
    fn from(s: &SourceState<T>) -> Self {
        Self {
            loading: s.loading,
            error: s.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesStatus {
    pub projects: SectionStatus,
    pub notifications: SectionStatus,
    pub metrics: SectionStatus,
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub notification: Notification,
    pub category: NotificationKind,
    pub time_ago: Option<String>,
    /// Navigation path on click, if the notification links anywhere.
    pub target: Option<String>,
}

impl ActivityEntry {
    pub fn new(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            category: NotificationKind::of(notification),
            time_ago: notification
                .created_at
                .as_deref()
                .and_then(|t| time_ago(t, now)),
            target: navigation_target(notification).map(|t| t.path()),
            notification: notification.clone(),
        }
    }
}

/// Stat-card counters in compact form ("1.5K", "2.3M").
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    pub total_projects: String,
    pub total_deployments: String,
    pub running_deployments: String,
    pub failed_deployments: String,
    pub unread_notifications: String,
}

impl SummaryDisplay {
    pub fn new(summary: &DashboardSummary, unread: usize) -> Self {
        let compact = |n: usize| format_number(n as u64);
        Self {
            total_projects: compact(summary.total_projects),
            total_deployments: compact(summary.total_deployments),
            running_deployments: compact(summary.running_deployments),
            failed_deployments: compact(summary.failed_deployments),
            unread_notifications: compact(unread),
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub display: SummaryDisplay,
    pub visible_cards: VisibilityMap,
    pub activity_filter: ActivityFilter,
    pub filtered_notifications: Vec<Notification>,
    pub recent_activity: Vec<ActivityEntry>,
    pub unread_count: usize,
    pub historical_data: Vec<MetricSample>,
    pub metrics: Option<MetricSample>,
    pub status: SourcesStatus,
    pub is_refreshing: bool,
}

impl DashboardState {
    pub fn any_loading(&self) -> bool {
        self.projects.loading || self.notifications.loading || self.metrics.loading
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.data.as_deref().unwrap_or_default()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.data.as_deref().unwrap_or_default()
    }

    pub fn latest_metrics(&self) -> Option<&MetricSample> {
        self.metrics.data.as_ref().and_then(|m| m.latest.as_ref())
    }

    pub fn find_notification(&self, id: &str) -> Option<&Notification> {
        self.notifications().iter().find(|n| n.id == id)
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::derive(self.projects(), self.latest_metrics(), self.any_loading())
    }

    pub fn view(
        &self,
        visible_cards: VisibilityMap,
        is_refreshing: bool,
        now: DateTime<Utc>,
    ) -> DashboardView {
        let notifications = self.notifications();
        let summary = self.summary();
        let unread = unread_count(notifications);
        DashboardView {
            display: SummaryDisplay::new(&summary, unread),
            summary,
            visible_cards,
            activity_filter: self.activity_filter.clone(),
            filtered_notifications: filter_notifications(notifications, &self.activity_filter)
                .into_iter()
                .cloned()
                .collect(),
            recent_activity: recent_activity(notifications, &self.activity_filter)
                .into_iter()
                .map(|n| ActivityEntry::new(n, now))
                .collect(),
            unread_count: unread,
            historical_data: self
                .metrics
                .data
                .as_ref()
                .map(|m| m.series.clone())
                .unwrap_or_default(),
            metrics: self.latest_metrics().cloned(),
            status: SourcesStatus {
                projects: (&self.projects).into(),
                notifications: (&self.notifications).into(),
                metrics: (&self.metrics).into(),
            },
            is_refreshing,
        }
    }
}
