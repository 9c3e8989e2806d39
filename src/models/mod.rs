// Dashboard data-transfer models (validated at the collaborator boundary)

mod metrics;
mod notification;
mod project;

pub use metrics::{RawMetricSample, RawNumber};
pub use notification::Notification;
pub use project::{Compose, Deployment, DeploymentStatus, Project};
