// Worker test: initial refresh, periodic metrics polls, shutdown

mod common;

use common::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use summaryd::service::DashboardService;
use summaryd::session_repo::MemorySessionStorage;
use summaryd::visibility::{DEFAULT_SESSION_KEY, VisibilityStore};
use summaryd::worker::{WorkerConfig, WorkerDeps, spawn};
use tokio::sync::broadcast;

#[tokio::test(start_paused = true)]
async fn worker_refreshes_then_polls_metrics_until_shutdown() {
    let projects = Stub::ok(vec![project("p1", vec![])]);
    let metrics = Stub::ok(vec![raw_sample("42", "10", "100")]);
    let visibility =
        VisibilityStore::load(Arc::new(MemorySessionStorage::new()), DEFAULT_SESSION_KEY).await;
    let (tx, mut rx) = broadcast::channel(64);
    let service = Arc::new(DashboardService::new(
        sources(projects.clone(), Stub::ok(vec![]), metrics.clone()),
        metrics_request(),
        visibility,
        tx,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            service: service.clone(),
            ws_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_rx,
        },
        WorkerConfig {
            poll_interval_ms: 25,
            initial_refresh: true,
            stats_log_interval_secs: 60,
        },
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    assert_eq!(projects.calls(), 1, "projects fetched only by the initial refresh");
    assert!(metrics.calls() >= 3, "initial refresh plus periodic polls");

    let first = rx.recv().await.expect("published view");
    assert_eq!(first.summary.total_projects, 1);
    let view = service.view().await;
    assert_eq!(view.metrics.map(|m| m.cpu), Some(42.0));
}
