use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use summaryd::*;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let client = sources::http_client(app_config.request_timeout())?;
    let sources = refresh::Sources {
        projects: Arc::new(sources::HttpProjectSource::new(
            client.clone(),
            &app_config.sources.projects_url,
        )),
        notifications: Arc::new(sources::HttpNotificationSource::new(
            client.clone(),
            &app_config.sources.notifications_url,
        )),
        metrics: Arc::new(sources::HttpMetricsSource::new(client)),
    };

    let session = Arc::new(session_repo::SqliteSessionStorage::connect(&app_config.storage.path).await?);
    session.init().await?;
    let visibility =
        visibility::VisibilityStore::load(session, app_config.storage.session_key.clone()).await;

    let (tx, _) = broadcast::channel::<state::DashboardView>(
        app_config.publishing.broadcast_capacity,
    );
    let metrics_request = app_config.metrics.request();
    tracing::info!(metrics_url = %metrics_request.url, "metrics source configured");
    let service = Arc::new(service::DashboardService::new(
        sources,
        metrics_request,
        visibility,
        tx,
    ));

    let ws_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            service: service.clone(),
            ws_connections: ws_connections.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            poll_interval_ms: app_config.metrics.poll_interval_ms,
            initial_refresh: true,
            stats_log_interval_secs: app_config.publishing.stats_log_interval_secs,
        },
    );

    let app = routes::app(
        service,
        Arc::new(local_stats::LocalStatsProbe::new()),
        ws_connections,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
