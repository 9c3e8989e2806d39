// Card visibility: per-section show/hide flags persisted in session storage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session_repo::SessionStorage;

/// Default session storage key for the visibility map.
pub const DEFAULT_SESSION_KEY: &str = "dashboardVisibleCards";

/// Known dashboard sections; serializes to camelCase (e.g. "quickActions").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CardKey {
    Stats,
    QuickActions,
    ResourceUsage,
    Trends,
    TopDeployments,
    Projects,
    RecentActivity,
    UserActions,
}

impl CardKey {
    pub const ALL: [CardKey; 8] = [
        CardKey::Stats,
        CardKey::QuickActions,
        CardKey::ResourceUsage,
        CardKey::Trends,
        CardKey::TopDeployments,
        CardKey::Projects,
        CardKey::RecentActivity,
        CardKey::UserActions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CardKey::Stats => "stats",
            CardKey::QuickActions => "quickActions",
            CardKey::ResourceUsage => "resourceUsage",
            CardKey::Trends => "trends",
            CardKey::TopDeployments => "topDeployments",
            CardKey::Projects => "projects",
            CardKey::RecentActivity => "recentActivity",
            CardKey::UserActions => "userActions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown card key: {0}")]
pub struct UnknownCardKey(pub String);

impl FromStr for CardKey {
    type Err = UnknownCardKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownCardKey(s.to_string()))
    }
}

/// Visibility flag for every known card key; never holds unknown keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityMap(BTreeMap<CardKey, bool>);

impl Default for VisibilityMap {
    fn default() -> Self {
        Self(CardKey::ALL.into_iter().map(|k| (k, true)).collect())
    }
}

impl VisibilityMap {
    pub fn is_visible(&self, key: CardKey) -> bool {
        self.0.get(&key).copied().unwrap_or(true)
    }

    pub fn set(&mut self, key: CardKey, visible: bool) {
        self.0.insert(key, visible);
    }

    /// Flips exactly one key.
    pub fn toggle(&mut self, key: CardKey) {
        let visible = self.is_visible(key);
        self.0.insert(key, !visible);
    }

    pub fn toggled(mut self, key: CardKey) -> Self {
        self.toggle(key);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardKey, bool)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Builds a map from persisted JSON. Known keys take the persisted boolean when present,
    /// otherwise true; unknown keys are dropped. Malformed input yields the all-visible default.
    pub fn from_persisted(json: &str) -> Self {
        let parsed: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(json) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "malformed persisted visibility map, using defaults");
                return Self::default();
            }
        };
        Self(
            CardKey::ALL
                .into_iter()
                .map(|k| {
                    let visible = parsed
                        .get(k.as_str())
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(true);
                    (k, visible)
                })
                .collect(),
        )
    }

    pub fn to_persisted(&self) -> String {
        let obj: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), serde_json::Value::Bool(v)))
            .collect();
        serde_json::Value::Object(obj).to_string()
    }
}

/// Holds the current map and writes it back to session storage on every change.
pub struct VisibilityStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
    map: Mutex<VisibilityMap>,
}

impl VisibilityStore {
    /// Loads the persisted map, falling back silently to defaults on read failure.
    pub async fn load(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let map = match storage.get(&key).await {
            Ok(Some(json)) => VisibilityMap::from_persisted(&json),
            Ok(None) => VisibilityMap::default(),
            Err(e) => {
                tracing::debug!(error = %e, operation = "load_visibility", "session read failed, using defaults");
                VisibilityMap::default()
            }
        };
        Self {
            storage,
            key,
            map: Mutex::new(map),
        }
    }

    pub async fn current(&self) -> VisibilityMap {
        self.map.lock().await.clone()
    }

    /// Flips one key and persists the full map. Returns the updated map.
    pub async fn toggle(&self, key: CardKey) -> VisibilityMap {
        let mut map = self.map.lock().await;
        map.toggle(key);
        self.persist(&map).await;
        map.clone()
    }

    pub async fn set(&self, key: CardKey, visible: bool) -> VisibilityMap {
        let mut map = self.map.lock().await;
        map.set(key, visible);
        self.persist(&map).await;
        map.clone()
    }

    // Write failures keep the in-memory map authoritative.
    async fn persist(&self, map: &VisibilityMap) {
        if let Err(e) = self.storage.set(&self.key, &map.to_persisted()).await {
            tracing::warn!(
                error = %e,
                operation = "save_visibility",
                "failed to persist visibility map"
            );
        }
    }
}
