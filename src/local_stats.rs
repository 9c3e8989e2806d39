// Host stats probe via sysinfo: rounded cpu / memory / disk usage percentages

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, System};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUsage {
    pub cpu: u8,
    pub memory: u8,
    pub disk: u8,
}

pub struct LocalStatsProbe {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
}

impl Default for LocalStatsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStatsProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
        }
    }

    /// Samples cpu over one minimum update interval, plus current memory and disk usage.
    #[instrument(skip(self), fields(repo = "local_stats", operation = "sample"))]
    pub async fn sample(&self) -> anyhow::Result<HostUsage> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            sys.refresh_cpu_usage();
            sys.refresh_memory();
            let cpu = sys.global_cpu_usage() as f64;
            let memory = rounded_percent(
                sys.total_memory().saturating_sub(sys.available_memory()),
                sys.total_memory(),
            );

            let mut disks = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("disks lock poisoned: {}", e))?;
            disks.refresh(false);
            let (total, available) = disks.list().iter().fold((0u64, 0u64), |(t, a), d| {
                (t + d.total_space(), a + d.available_space())
            });
            let disk = rounded_percent(total.saturating_sub(available), total);

            Ok(HostUsage {
                cpu: cpu.round().clamp(0.0, 100.0) as u8,
                memory,
                disk,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("local stats task join: {}", e))?
    }
}

/// used / total as a whole percentage; 0 when total is 0.
pub fn rounded_percent(used: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((used as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
