// Notification filter, unread count and click routing

use serde::{Deserialize, Serialize};

use crate::models::Notification;

/// Number of entries shown in the recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

const ALL: &str = "all";

/// Active notification filter: everything, or one type/channel value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityFilter {
    #[default]
    All,
    Only(String),
}

impl From<String> for ActivityFilter {
    fn from(s: String) -> Self {
        if s == ALL {
            ActivityFilter::All
        } else {
            ActivityFilter::Only(s)
        }
    }
}

impl From<&str> for ActivityFilter {
    fn from(s: &str) -> Self {
        ActivityFilter::from(s.to_string())
    }
}

impl From<ActivityFilter> for String {
    fn from(f: ActivityFilter) -> Self {
        match f {
            ActivityFilter::All => ALL.to_string(),
            ActivityFilter::Only(s) => s,
        }
    }
}

impl ActivityFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Only(selector) => {
                notification.kind.as_deref() == Some(selector.as_str())
                    || notification.channel.as_deref() == Some(selector.as_str())
            }
        }
    }
}

/// Subset of `notifications` matching `filter`, in input order.
/// A selector matching nothing yields an empty list.
pub fn filter_notifications<'a>(
    notifications: &'a [Notification],
    filter: &ActivityFilter,
) -> Vec<&'a Notification> {
    notifications.iter().filter(|n| filter.matches(n)).collect()
}

/// Counts unread notifications over the full (unfiltered) list.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// First entries of the filtered list, as shown in the activity feed.
pub fn recent_activity<'a>(
    notifications: &'a [Notification],
    filter: &ActivityFilter,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| filter.matches(n))
        .take(RECENT_ACTIVITY_LIMIT)
        .collect()
}

/// Where a click on a notification navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NavTarget {
    Project(String),
    Deployment(String),
}

impl NavTarget {
    pub fn path(&self) -> String {
        match self {
            NavTarget::Project(id) => format!("/dashboard/projects/{}", id),
            NavTarget::Deployment(id) => format!("/dashboard/compose/{}", id),
        }
    }
}

/// A project reference takes priority over a deployment reference.
pub fn navigation_target(notification: &Notification) -> Option<NavTarget> {
    if let Some(project_id) = non_empty(notification.project_id.as_deref()) {
        return Some(NavTarget::Project(project_id.to_string()));
    }
    non_empty(notification.deployment_id.as_deref())
        .map(|deployment_id| NavTarget::Deployment(deployment_id.to_string()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Coarse category of a notification, derived from its type (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Deployment,
    Project,
    Error,
    Other,
}

impl NotificationKind {
    pub fn of(notification: &Notification) -> Self {
        match notification.kind.as_deref().map(str::to_lowercase).as_deref() {
            Some("deployment") => NotificationKind::Deployment,
            Some("project") => NotificationKind::Project,
            Some("error") => NotificationKind::Error,
            _ => NotificationKind::Other,
        }
    }
}
