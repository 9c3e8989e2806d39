// Display helpers for counters and relative timestamps

use chrono::{DateTime, Utc};

/// Compact count: 1500 -> "1.5K", 2_300_000 -> "2.3M".
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1000 {
        format!("{:.1}K", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

/// Relative age of an RFC 3339 timestamp ("5m ago", "3h ago", "2d ago").
/// Returns `None` when the timestamp does not parse.
pub fn time_ago(created_at: &str, now: DateTime<Utc>) -> Option<String> {
    let past = DateTime::parse_from_rfc3339(created_at).ok()?;
    let minutes = now
        .signed_duration_since(past.with_timezone(&Utc))
        .num_minutes();
    Some(if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    })
}
