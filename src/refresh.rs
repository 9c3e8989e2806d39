// Refresh coordinator: concurrent re-fetch of every source joined on an all-settled barrier

use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::metrics::normalize;
use crate::models::{Notification, Project, RawMetricSample};
use crate::sources::{MetricsRequest, MetricsSource, NotificationSource, ProjectSource};
use crate::state::DashboardState;

/// Outcome of one joined task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T, E> {
    Fulfilled(T),
    Rejected(E),
    /// The task panicked or was cancelled before producing a result.
    Panicked(String),
}

/// Runs every future concurrently and waits for all of them, whatever each outcome.
/// Results are returned in input order.
pub async fn settle_all<T, E, F>(futures: Vec<F>) -> Vec<Settled<T, E>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let handles: Vec<_> = futures.into_iter().map(tokio::spawn).collect();
    let mut settled = Vec::with_capacity(handles.len());
    for handle in handles {
        settled.push(match handle.await {
            Ok(Ok(value)) => Settled::Fulfilled(value),
            Ok(Err(e)) => Settled::Rejected(e),
            Err(e) => Settled::Panicked(e.to_string()),
        });
    }
    settled
}

/// Counts refresh cycles in flight; decremented on drop so a failed cycle still clears.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Collaborators the coordinator fetches from.
#[derive(Clone)]
pub struct Sources {
    pub projects: Arc<dyn ProjectSource>,
    pub notifications: Arc<dyn NotificationSource>,
    pub metrics: Arc<dyn MetricsSource>,
}

enum Fetched {
    Projects(Vec<Project>),
    Notifications(Vec<Notification>),
    Metrics(Vec<RawMetricSample>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Projects,
    Notifications,
    Metrics,
}

const SOURCE_KINDS: [SourceKind; 3] = [
    SourceKind::Projects,
    SourceKind::Notifications,
    SourceKind::Metrics,
];

impl SourceKind {
    fn name(self) -> &'static str {
        match self {
            SourceKind::Projects => "projects",
            SourceKind::Notifications => "notifications",
            SourceKind::Metrics => "metrics",
        }
    }
}

/// Per-source result of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

pub struct RefreshCoordinator {
    sources: Sources,
    metrics_request: MetricsRequest,
    state: Arc<RwLock<DashboardState>>,
    in_flight: Arc<AtomicUsize>,
}

impl RefreshCoordinator {
    pub fn new(
        sources: Sources,
        metrics_request: MetricsRequest,
        state: Arc<RwLock<DashboardState>>,
    ) -> Self {
        Self {
            sources,
            metrics_request,
            state,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// True from invocation of `refresh_all` until every fetch of every cycle has settled.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Re-fetches projects, notifications and metrics concurrently. Each result is applied
    /// to the shared state as soon as its own fetch settles. The cycle runs on its own task,
    /// so dropping the returned future does not cancel it. Concurrent calls run as
    /// independent cycles.
    pub async fn refresh_all(&self) -> RefreshReport {
        let guard = InFlightGuard::enter(self.in_flight.clone());
        let tasks: Vec<BoxFuture<'static, Result<(), String>>> = SOURCE_KINDS
            .iter()
            .map(|kind| self.fetch_and_apply(*kind))
            .collect();
        let state = self.state.clone();

        let cycle = tokio::spawn(async move {
            let _guard = guard;
            let settled = settle_all(tasks).await;

            let mut report = RefreshReport::default();
            for (kind, outcome) in SOURCE_KINDS.into_iter().zip(settled) {
                match outcome {
                    Settled::Fulfilled(()) => report.succeeded.push(kind.name()),
                    Settled::Rejected(e) => report.failed.push((kind.name(), e)),
                    Settled::Panicked(e) => {
                        tracing::warn!(error = %e, source = kind.name(), operation = "refresh", "fetch task panicked");
                        fail(&mut *state.write().await, kind, e.clone());
                        report.failed.push((kind.name(), e));
                    }
                }
            }
            tracing::debug!(
                operation = "refresh",
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                "refresh cycle settled"
            );
            report
        });

        match cycle.await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, operation = "refresh", "refresh cycle aborted");
                RefreshReport {
                    succeeded: Vec::new(),
                    failed: SOURCE_KINDS
                        .iter()
                        .map(|kind| (kind.name(), e.to_string()))
                        .collect(),
                }
            }
        }
    }

    /// One metrics fetch; applied last-write-wins. Used by the periodic poller.
    pub async fn poll_metrics(&self) -> bool {
        let result = self
            .sources
            .metrics
            .fetch_metrics(&self.metrics_request)
            .await;
        let mut state = self.state.write().await;
        match result {
            Ok(raw) => {
                state.metrics.settle(Ok(normalize(&raw)));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, source = "metrics", operation = "poll_metrics", "fetch failed");
                state.metrics.settle(Err(e.to_string()));
                false
            }
        }
    }

    fn fetch_and_apply(&self, kind: SourceKind) -> BoxFuture<'static, Result<(), String>> {
        let state = self.state.clone();
        let fetch = self.fetch(kind);
        Box::pin(async move {
            match fetch.await {
                Ok(fetched) => {
                    apply(&mut *state.write().await, fetched);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!(error = %e, source = kind.name(), operation = "refresh", "fetch failed");
                    fail(&mut *state.write().await, kind, e.clone());
                    Err(e)
                }
            }
        })
    }

    fn fetch(&self, kind: SourceKind) -> BoxFuture<'static, Result<Fetched, String>> {
        match kind {
            SourceKind::Projects => {
                let source = self.sources.projects.clone();
                Box::pin(async move {
                    source
                        .fetch_projects()
                        .await
                        .map(Fetched::Projects)
                        .map_err(|e| e.to_string())
                })
            }
            SourceKind::Notifications => {
                let source = self.sources.notifications.clone();
                Box::pin(async move {
                    source
                        .fetch_notifications()
                        .await
                        .map(Fetched::Notifications)
                        .map_err(|e| e.to_string())
                })
            }
            SourceKind::Metrics => {
                let source = self.sources.metrics.clone();
                let request = self.metrics_request.clone();
                Box::pin(async move {
                    source
                        .fetch_metrics(&request)
                        .await
                        .map(Fetched::Metrics)
                        .map_err(|e| e.to_string())
                })
            }
        }
    }
}

fn apply(state: &mut DashboardState, fetched: Fetched) {
    match fetched {
        Fetched::Projects(p) => state.projects.settle(Ok(p)),
        Fetched::Notifications(n) => state.notifications.settle(Ok(n)),
        Fetched::Metrics(raw) => state.metrics.settle(Ok(normalize(&raw))),
    }
}

fn fail(state: &mut DashboardState, kind: SourceKind, error: String) {
    match kind {
        SourceKind::Projects => state.projects.settle(Err(error)),
        SourceKind::Notifications => state.notifications.settle(Err(error)),
        SourceKind::Metrics => state.metrics.settle(Err(error)),
    }
}
