// Dashboard aggregator: totals, first-N lists and health from projects + latest metrics

use serde::Serialize;

use crate::metrics::MetricSample;
use crate::models::{Deployment, DeploymentStatus, Project};

/// Length of the top-deployments and most-active-projects lists.
pub const TOP_N: usize = 5;

const CRITICAL_THRESHOLD: f64 = 90.0;
const WARNING_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Unknown,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
}

/// Health from the latest sample. `mem_used` is the memory percentage reported by the
/// metrics server. A sample with neither cpu nor memory set counts as unknown.
pub fn health_status(latest: Option<&MetricSample>, loading: bool) -> HealthReport {
    if loading {
        return HealthReport {
            status: HealthStatus::Loading,
            cpu: None,
            memory: None,
        };
    }
    let Some(sample) = latest.filter(|s| s.cpu != 0.0 || s.mem_used != 0.0) else {
        return HealthReport {
            status: HealthStatus::Unknown,
            cpu: None,
            memory: None,
        };
    };
    let (cpu, memory) = (sample.cpu, sample.mem_used);
    let status = if cpu > CRITICAL_THRESHOLD || memory > CRITICAL_THRESHOLD {
        HealthStatus::Critical
    } else if cpu > WARNING_THRESHOLD || memory > WARNING_THRESHOLD {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };
    HealthReport {
        status,
        cpu: Some(cpu),
        memory: Some(memory),
    }
}

/// All deployments across every project's composes, in input order.
pub fn flatten_deployments(projects: &[Project]) -> Vec<&Deployment> {
    projects
        .iter()
        .flat_map(|p| p.compose.iter())
        .flat_map(|c| c.deployments.iter())
        .collect()
}

/// Derived dashboard values. Pure; no side effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub total_deployments: usize,
    pub running_deployments: usize,
    pub failed_deployments: usize,
    /// First `TOP_N` deployments in input order; not ranked by resource usage.
    pub top_deployments: Vec<Deployment>,
    /// First `TOP_N` projects in input order; not ranked by activity.
    pub most_active_projects: Vec<Project>,
    pub health: HealthReport,
}

impl DashboardSummary {
    /// `loading` is true while any source has not settled yet.
    pub fn derive(projects: &[Project], latest: Option<&MetricSample>, loading: bool) -> Self {
        let deployments = flatten_deployments(projects);
        let count_status = |status: DeploymentStatus| {
            deployments.iter().filter(|d| d.status == status).count()
        };
        Self {
            total_projects: projects.len(),
            total_deployments: deployments.len(),
            running_deployments: count_status(DeploymentStatus::Running),
            failed_deployments: count_status(DeploymentStatus::Failed),
            top_deployments: deployments.iter().take(TOP_N).map(|d| (*d).clone()).collect(),
            most_active_projects: projects.iter().take(TOP_N).cloned().collect(),
            health: health_status(latest, loading),
        }
    }
}
