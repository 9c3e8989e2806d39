// Upstream collaborators: project list, notification list, metrics server

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use crate::models::{Notification, Project, RawMetricSample};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{source_name}: request timed out")]
    Timeout { source_name: &'static str },
    #[error("{source_name}: request failed: {error}")]
    Http {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },
    #[error("{source_name}: unexpected status {status}")]
    Status {
        source_name: &'static str,
        status: u16,
    },
    #[error("{source_name}: invalid payload: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },
}

/// Arguments for one metrics query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRequest {
    pub url: String,
    pub token: String,
    pub data_points: u32,
}

#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn fetch_projects(&self) -> Result<Vec<Project>, SourceError>;
}

#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, SourceError>;
}

#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_metrics(
        &self,
        request: &MetricsRequest,
    ) -> Result<Vec<RawMetricSample>, SourceError>;
}

/// Builds the shared HTTP client with the configured request timeout.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    source_name: &'static str,
) -> Result<T, SourceError> {
    let map_err = |error: reqwest::Error| {
        if error.is_timeout() {
            SourceError::Timeout { source_name }
        } else {
            SourceError::Http { source_name, error }
        }
    };
    let response = request.send().await.map_err(map_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            source_name,
            status: status.as_u16(),
        });
    }
    let body = response.text().await.map_err(map_err)?;
    serde_json::from_str(&body).map_err(|e| SourceError::Decode {
        source_name,
        message: e.to_string(),
    })
}

pub struct HttpProjectSource {
    client: Client,
    url: String,
}

impl HttpProjectSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ProjectSource for HttpProjectSource {
    #[instrument(skip(self), fields(source = "projects", url = %self.url))]
    async fn fetch_projects(&self) -> Result<Vec<Project>, SourceError> {
        get_json(self.client.get(&self.url), "projects").await
    }
}

pub struct HttpNotificationSource {
    client: Client,
    url: String,
}

impl HttpNotificationSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationSource for HttpNotificationSource {
    #[instrument(skip(self), fields(source = "notifications", url = %self.url))]
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, SourceError> {
        get_json(self.client.get(&self.url), "notifications").await
    }
}

/// Metrics server client: `GET {url}?limit={data_points}` with a bearer token.
pub struct HttpMetricsSource {
    client: Client,
}

impl HttpMetricsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    #[instrument(skip(self, request), fields(source = "metrics", url = %request.url))]
    async fn fetch_metrics(
        &self,
        request: &MetricsRequest,
    ) -> Result<Vec<RawMetricSample>, SourceError> {
        let builder = self
            .client
            .get(&request.url)
            .query(&[("limit", request.data_points)])
            .header(header::AUTHORIZATION, format!("Bearer {}", request.token));
        get_json(builder, "metrics").await
    }
}
