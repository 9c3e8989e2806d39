// Raw metric samples as served by the metrics server

use serde::{Deserialize, Serialize};

/// A numeric field that the metrics server may send as a string or a number.
/// Anything else lands in `Other` so one bad field never fails the whole sample list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// One raw reading. Every numeric field is optional and may be unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetricSample {
    #[serde(default, alias = "date")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cpu: Option<RawNumber>,
    #[serde(default)]
    pub mem_used: Option<RawNumber>,
    #[serde(default, rename = "memUsedGB")]
    pub mem_used_gb: Option<RawNumber>,
    #[serde(default)]
    pub mem_total: Option<RawNumber>,
    #[serde(default)]
    pub disk_used: Option<RawNumber>,
    #[serde(default)]
    pub total_disk: Option<RawNumber>,
    #[serde(default)]
    pub network_in: Option<RawNumber>,
    #[serde(default)]
    pub network_out: Option<RawNumber>,
}
