use serde::Deserialize;
use std::time::Duration;

use crate::sources::MetricsRequest;
use crate::visibility::DEFAULT_SESSION_KEY;

const LOCAL_METRICS_URL: &str = "http://localhost:3001/metrics";
const DEFAULT_METRICS_TOKEN: &str = "metrics";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub storage: StorageConfig,
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub projects_url: String,
    pub notifications_url: String,
    /// Per-request timeout for every upstream call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_data_points")]
    pub data_points: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            production: false,
            server_ip: None,
            port: None,
            token: None,
            data_points: default_data_points(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_data_points() -> u32 {
    50
}

fn default_poll_interval_ms() -> u64 {
    10_000
}

impl MetricsConfig {
    /// Remote metrics endpoint in production when server ip and port are known,
    /// the local development endpoint otherwise.
    pub fn endpoint(&self) -> String {
        match (self.production, self.server_ip.as_deref(), self.port) {
            (true, Some(ip), Some(port)) if !ip.is_empty() && port > 0 => {
                format!("http://{}:{}/metrics", ip, port)
            }
            _ => LOCAL_METRICS_URL.to_string(),
        }
    }

    pub fn token(&self) -> String {
        match self.token.as_deref() {
            Some(token) if self.production && !token.is_empty() => token.to_string(),
            _ => DEFAULT_METRICS_TOKEN.to_string(),
        }
    }

    pub fn request(&self) -> MetricsRequest {
        MetricsRequest {
            url: self.endpoint(),
            token: self.token(),
            data_points: self.data_points,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite file backing session storage.
    pub path: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of dashboard views kept in the broadcast channel for /ws/dashboard (slow clients may lag).
    pub broadcast_capacity: usize,
    /// How often the worker logs connected dashboard clients and poll counts.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.sources.request_timeout_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.sources.projects_url.is_empty(),
            "sources.projects_url must be non-empty"
        );
        anyhow::ensure!(
            !self.sources.notifications_url.is_empty(),
            "sources.notifications_url must be non-empty"
        );
        anyhow::ensure!(
            self.sources.request_timeout_ms > 0,
            "sources.request_timeout_ms must be > 0, got {}",
            self.sources.request_timeout_ms
        );
        anyhow::ensure!(
            self.metrics.data_points > 0,
            "metrics.data_points must be > 0, got {}",
            self.metrics.data_points
        );
        anyhow::ensure!(
            self.metrics.poll_interval_ms > 0,
            "metrics.poll_interval_ms must be > 0, got {}",
            self.metrics.poll_interval_ms
        );
        anyhow::ensure!(
            !self.storage.path.is_empty(),
            "storage.path must be non-empty"
        );
        anyhow::ensure!(
            !self.storage.session_key.is_empty(),
            "storage.session_key must be non-empty"
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.publishing.stats_log_interval_secs > 0,
            "publishing.stats_log_interval_secs must be > 0, got {}",
            self.publishing.stats_log_interval_secs
        );
        Ok(())
    }
}
