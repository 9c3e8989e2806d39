// Background metrics poller.
// Every tick spawns an independent fetch; overlapping polls are tolerated and the last one to
// finish wins on the displayed snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, interval};
use tracing::Instrument;

use crate::service::DashboardService;

pub struct WorkerDeps {
    pub service: Arc<DashboardService>,
    /// Live /ws/dashboard clients, reported in the periodic stats line.
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    /// Run one full refresh before the first poll.
    pub initial_refresh: bool,
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        service,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        poll_interval_ms,
        initial_refresh,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_ms);
    tokio::spawn(async move {
        let mut polls_started: u64 = 0;

        if initial_refresh {
            let report = service.refresh_all().await;
            tracing::info!(
                operation = "initial_refresh",
                succeeded = ?report.succeeded,
                failed = report.failed.len(),
                "initial dashboard load settled"
            );
        }

        let mut tick = interval(Duration::from_millis(poll_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; the initial load already covered it.
        if initial_refresh {
            tick.tick().await;
        }

        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    polls_started += 1;
                    let n = polls_started;
                    let service = service.clone();
                    tokio::spawn(async move {
                        service.poll_metrics().await;
                        tracing::debug!(operation = "poll_metrics", poll = n, "metrics poll finished");
                    });
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_dashboard_clients = ws_connections.load(Ordering::Relaxed),
                        polls_started,
                        refreshing = service.is_refreshing(),
                        "app stats"
                    );
                }
            }
        }
    }
    .instrument(worker_span))
}
