// Project, compose and deployment models

use serde::{Deserialize, Serialize};

/// Deployment status; lowercase on the wire (e.g. "running"). Unknown spellings map to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Running,
    Failed,
    Pending,
    #[default]
    #[serde(other)]
    Other,
}

/// A single workload inside a compose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(alias = "deploymentId")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: DeploymentStatus,
}

/// Multi-service deployable unit grouping deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compose {
    #[serde(default, alias = "composeId")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// User-owned deployable unit. A missing `compose` list is treated as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(alias = "projectId")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub compose: Vec<Compose>,
}
