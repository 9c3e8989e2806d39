// Metrics normalizer: raw string-valued samples -> numeric series + latest snapshot

use serde::Serialize;

use crate::models::{RawMetricSample, RawNumber};

/// One normalized reading. Unparseable or missing raw values become 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub timestamp: Option<String>,
    pub cpu: f64,
    pub mem_used: f64,
    #[serde(rename = "memUsedGB")]
    pub mem_used_gb: f64,
    pub mem_total: f64,
    pub disk_used: f64,
    pub total_disk: f64,
    pub network_in: f64,
    pub network_out: f64,
}

impl MetricSample {
    /// mem_used / mem_total * 100, or 0 when mem_total is 0.
    pub fn memory_percent(&self) -> f64 {
        percent_of(self.mem_used, self.mem_total)
    }

    /// disk_used / total_disk * 100, or 0 when total_disk is 0.
    pub fn disk_percent(&self) -> f64 {
        percent_of(self.disk_used, self.total_disk)
    }
}

/// Full ordered series plus the most recent sample.
/// `latest` is `None` when the input was empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetrics {
    pub series: Vec<MetricSample>,
    pub latest: Option<MetricSample>,
}

/// Normalizes raw samples, preserving input (chronological) order.
pub fn normalize(raw: &[RawMetricSample]) -> NormalizedMetrics {
    let series: Vec<MetricSample> = raw.iter().map(normalize_sample).collect();
    let latest = series.last().cloned();
    NormalizedMetrics { series, latest }
}

pub fn normalize_sample(raw: &RawMetricSample) -> MetricSample {
    MetricSample {
        timestamp: raw.timestamp.clone(),
        cpu: parse_number(raw.cpu.as_ref()),
        mem_used: parse_number(raw.mem_used.as_ref()),
        mem_used_gb: parse_number(raw.mem_used_gb.as_ref()),
        mem_total: parse_number(raw.mem_total.as_ref()),
        disk_used: parse_number(raw.disk_used.as_ref()),
        total_disk: parse_number(raw.total_disk.as_ref()),
        network_in: parse_number(raw.network_in.as_ref()),
        network_out: parse_number(raw.network_out.as_ref()),
    }
}

/// Parses a raw field to a finite f64. Missing, non-numeric, NaN and infinite values yield 0.
pub fn parse_number(raw: Option<&RawNumber>) -> f64 {
    let value = match raw {
        Some(RawNumber::Number(n)) => *n,
        Some(RawNumber::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => {
                tracing::debug!(raw = %s, "unparseable metric value, using 0");
                0.0
            }
        },
        Some(RawNumber::Other(v)) => {
            tracing::debug!(raw = %v, "non-numeric metric value, using 0");
            0.0
        }
        None => 0.0,
    };
    if value.is_finite() { value } else { 0.0 }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let pct = part / whole * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}
