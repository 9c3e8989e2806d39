// Refresh coordinator tests: all-settled join, in-flight flag, per-source errors

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use summaryd::models::DeploymentStatus;
use summaryd::refresh::RefreshCoordinator;
use summaryd::state::DashboardState;
use tokio::sync::RwLock;

fn coordinator(sources: summaryd::refresh::Sources) -> (Arc<RefreshCoordinator>, Arc<RwLock<DashboardState>>) {
    let state = Arc::new(RwLock::new(DashboardState::default()));
    let coordinator = Arc::new(RefreshCoordinator::new(
        sources,
        metrics_request(),
        state.clone(),
    ));
    (coordinator, state)
}

#[tokio::test]
async fn refresh_fetches_every_source_and_applies_results() {
    let projects = Stub::ok(vec![project(
        "p1",
        vec![deployment("d1", DeploymentStatus::Running)],
    )]);
    let notifications = Stub::ok(vec![notification("n1", "deployment", false)]);
    let metrics = Stub::ok(vec![raw_sample("20", "30", "100")]);
    let (coordinator, state) = coordinator(sources(
        projects.clone(),
        notifications.clone(),
        metrics.clone(),
    ));

    assert!(state.read().await.any_loading());
    let report = coordinator.refresh_all().await;

    assert_eq!(report.succeeded, vec!["projects", "notifications", "metrics"]);
    assert!(report.failed.is_empty());
    assert_eq!((projects.calls(), notifications.calls(), metrics.calls()), (1, 1, 1));

    let state = state.read().await;
    assert!(!state.any_loading());
    assert_eq!(state.projects().len(), 1);
    assert_eq!(state.notifications().len(), 1);
    assert_eq!(state.latest_metrics().map(|m| m.cpu), Some(20.0));
    assert!(!coordinator.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn is_refreshing_until_slowest_source_settles() {
    let (coordinator, _state) = coordinator(sources(
        Stub::ok(vec![]),
        Stub::delayed(Some(vec![]), Duration::from_millis(200)),
        Stub::ok(vec![]),
    ));
    assert!(!coordinator.is_refreshing());

    let running = coordinator.clone();
    let handle = tokio::spawn(async move { running.refresh_all().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.is_refreshing(), "fast sources settled but slow one has not");

    handle.await.unwrap();
    assert!(!coordinator.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn failure_does_not_block_settle_or_other_sections() {
    let (coordinator, state) = coordinator(sources(
        Stub::ok(vec![project("p1", vec![])]),
        Stub::failing(),
        Stub::delayed(Some(vec![raw_sample("50", "50", "100")]), Duration::from_millis(50)),
    ));

    let report = coordinator.refresh_all().await;
    assert_eq!(report.succeeded, vec!["projects", "metrics"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "notifications");
    assert!(!coordinator.is_refreshing());

    let state = state.read().await;
    assert_eq!(state.projects.error, None);
    assert!(state.notifications.error.as_deref().unwrap().contains("500"));
    assert!(!state.notifications.loading);
    assert!(state.notifications().is_empty());
    assert_eq!(state.latest_metrics().map(|m| m.cpu), Some(50.0));
}

#[tokio::test]
async fn failed_refetch_keeps_previous_data() {
    let projects = Stub::ok(vec![project("p1", vec![])]);
    let (coordinator, state) = coordinator(sources(
        projects.clone(),
        Stub::ok(vec![]),
        Stub::ok(vec![]),
    ));
    coordinator.refresh_all().await;
    projects.set(None);
    coordinator.refresh_all().await;

    let state = state.read().await;
    assert_eq!(state.projects().len(), 1);
    assert!(state.projects.error.is_some());
    assert!(!state.projects.loading);
}

#[tokio::test(start_paused = true)]
async fn concurrent_refresh_cycles_run_independently() {
    let projects = Stub::delayed(Some(vec![]), Duration::from_millis(100));
    let (coordinator, _state) = coordinator(sources(
        projects.clone(),
        Stub::ok(vec![]),
        Stub::ok(vec![]),
    ));

    let a = coordinator.clone();
    let b = coordinator.clone();
    let first = tokio::spawn(async move { a.refresh_all().await });
    tokio::time::sleep(Duration::from_millis(30)).await;
    let second = tokio::spawn(async move { b.refresh_all().await });

    first.await.unwrap();
    assert!(coordinator.is_refreshing(), "second cycle still in flight");
    second.await.unwrap();
    assert!(!coordinator.is_refreshing());
    assert_eq!(projects.calls(), 2);
}

#[tokio::test]
async fn poll_metrics_only_touches_metrics() {
    let projects = Stub::ok(vec![]);
    let metrics = Stub::ok(vec![raw_sample("75", "10", "100")]);
    let (coordinator, state) = coordinator(sources(
        projects.clone(),
        Stub::ok(vec![]),
        metrics.clone(),
    ));

    assert!(coordinator.poll_metrics().await);
    assert_eq!(projects.calls(), 0);
    let state = state.read().await;
    assert!(!state.metrics.loading);
    assert!(state.projects.loading);
    assert_eq!(state.latest_metrics().map(|m| m.cpu), Some(75.0));
}

#[tokio::test(start_paused = true)]
async fn overlapping_polls_last_write_wins() {
    let slow = Stub::delayed(Some(vec![raw_sample("10", "0", "0")]), Duration::from_millis(80));
    let (coordinator, state) = coordinator(sources(Stub::ok(vec![]), Stub::ok(vec![]), slow.clone()));

    let first = coordinator.clone();
    let handle = tokio::spawn(async move { first.poll_metrics().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    slow.set(Some(vec![raw_sample("60", "0", "0")]));
    // Both polls in flight; the second one finishes last.
    let second = coordinator.clone();
    let handle2 = tokio::spawn(async move { second.poll_metrics().await });
    handle.await.unwrap();
    handle2.await.unwrap();

    assert_eq!(state.read().await.latest_metrics().map(|m| m.cpu), Some(60.0));
}

#[tokio::test(start_paused = true)]
async fn abandoned_refresh_still_applies_results() {
    let projects = Stub::delayed(
        Some(vec![project("p1", vec![])]),
        Duration::from_millis(100),
    );
    let (coordinator, state) = coordinator(sources(
        projects.clone(),
        Stub::ok(vec![]),
        Stub::ok(vec![]),
    ));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), coordinator.refresh_all()).await;
    assert!(abandoned.is_err(), "caller gave up before the slow source settled");
    assert!(coordinator.is_refreshing(), "cycle keeps running without its caller");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(projects.calls(), 1);
    assert!(!coordinator.is_refreshing());
    let state = state.read().await;
    assert!(!state.any_loading());
    assert_eq!(state.projects().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fast_sources_apply_before_slow_one_settles() {
    let (coordinator, state) = coordinator(sources(
        Stub::ok(vec![project("p1", vec![])]),
        Stub::ok(vec![notification("n1", "deployment", false)]),
        Stub::delayed(Some(vec![raw_sample("30", "10", "100")]), Duration::from_millis(200)),
    ));

    let running = coordinator.clone();
    let handle = tokio::spawn(async move { running.refresh_all().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    {
        let state = state.read().await;
        assert_eq!(state.projects().len(), 1);
        assert_eq!(state.notifications().len(), 1);
        assert!(state.metrics.loading);
    }
    assert!(coordinator.is_refreshing());

    handle.await.unwrap();
    assert_eq!(state.read().await.latest_metrics().map(|m| m.cpu), Some(30.0));
}
