// Shared test helpers: fixtures and stub collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use summaryd::models::*;
use summaryd::refresh::Sources;
use summaryd::session_repo::{SessionStorage, StorageError};
use summaryd::sources::{
    MetricsRequest, MetricsSource, NotificationSource, ProjectSource, SourceError,
};

pub fn deployment(id: &str, status: DeploymentStatus) -> Deployment {
    Deployment {
        id: id.into(),
        name: Some(format!("svc-{}", id)),
        status,
    }
}

pub fn project(id: &str, deployments: Vec<Deployment>) -> Project {
    Project {
        id: id.into(),
        name: format!("project-{}", id),
        compose: vec![Compose {
            id: format!("compose-{}", id),
            name: None,
            deployments,
        }],
    }
}

pub fn notification(id: &str, kind: &str, read: bool) -> Notification {
    Notification {
        id: id.into(),
        kind: Some(kind.into()),
        channel: None,
        title: None,
        message: Some(format!("{} event", kind)),
        created_at: None,
        read,
        project_id: None,
        deployment_id: None,
    }
}

pub fn raw_sample(cpu: &str, mem_used: &str, mem_total: &str) -> RawMetricSample {
    RawMetricSample {
        cpu: Some(RawNumber::Text(cpu.into())),
        mem_used: Some(RawNumber::Text(mem_used.into())),
        mem_total: Some(RawNumber::Text(mem_total.into())),
        ..Default::default()
    }
}

pub fn metrics_request() -> MetricsRequest {
    MetricsRequest {
        url: "http://localhost:3001/metrics".into(),
        token: "metrics".into(),
        data_points: 50,
    }
}

fn failure(source_name: &'static str) -> SourceError {
    SourceError::Status {
        source_name,
        status: 500,
    }
}

/// Source returning a fixed payload (or a 500 when `None`) after `delay`.
pub struct Stub<T> {
    pub payload: std::sync::Mutex<Option<T>>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl<T: Clone> Stub<T> {
    pub fn ok(payload: T) -> Arc<Self> {
        Arc::new(Self {
            payload: std::sync::Mutex::new(Some(payload)),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            payload: std::sync::Mutex::new(None),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn delayed(payload: Option<T>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            payload: std::sync::Mutex::new(payload),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, payload: Option<T>) {
        *self.payload.lock().unwrap() = payload;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, source_name: &'static str) -> Result<T, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Payload is captured when the request is made, not when it completes.
        let payload = self.payload.lock().unwrap().clone();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        payload.ok_or_else(|| failure(source_name))
    }
}

#[async_trait]
impl ProjectSource for Stub<Vec<Project>> {
    async fn fetch_projects(&self) -> Result<Vec<Project>, SourceError> {
        self.respond("projects").await
    }
}

#[async_trait]
impl NotificationSource for Stub<Vec<Notification>> {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, SourceError> {
        self.respond("notifications").await
    }
}

#[async_trait]
impl MetricsSource for Stub<Vec<RawMetricSample>> {
    async fn fetch_metrics(
        &self,
        _request: &MetricsRequest,
    ) -> Result<Vec<RawMetricSample>, SourceError> {
        self.respond("metrics").await
    }
}

pub fn sources(
    projects: Arc<Stub<Vec<Project>>>,
    notifications: Arc<Stub<Vec<Notification>>>,
    metrics: Arc<Stub<Vec<RawMetricSample>>>,
) -> Sources {
    Sources {
        projects,
        notifications,
        metrics,
    }
}

/// Session storage whose reads and writes always fail.
pub struct BrokenStorage;

#[async_trait]
impl SessionStorage for BrokenStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::other("storage unavailable")))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("storage unavailable")))
    }
}
