// Notification event record

use serde::{Deserialize, Serialize};

/// One notification as returned by the notification source.
/// A missing `read` flag counts as unread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub deployment_id: Option<String>,
}
