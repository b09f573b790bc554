//! Alignment and graph period resolution

use crate::catalog::{CLOUD_MONITORING_AUTO, GRAFANA_AUTO, STACKDRIVER_AUTO};

/// Smallest alignment period the dashboard interval may resolve to
const MIN_ALIGNMENT_SECS: u64 = 60;

const HOUR_SECS: i64 = 3600;
const DAY_SECS: i64 = 24 * HOUR_SECS;

/// `graphPeriod` value that turns graph periods off
pub const GRAPH_PERIOD_DISABLED: &str = "disabled";
/// `graphPeriod` value that follows the dashboard interval
pub const GRAPH_PERIOD_AUTO: &str = "auto";

/// Resolve an alignment period selection into the `+{seconds}s` form the
/// backend expects
///
/// - `grafana-auto` (or empty): the dashboard interval, at least 60 seconds
/// - `cloud-monitoring-auto` / `stackdriver-auto`: stepped on the range
///   length, `+60s` under 23 hours, `+300s` under 6 days, else `+3600s`
/// - a fixed period is returned with a leading `+`
pub fn calculate_alignment_period(period: &str, interval_ms: u64, range_secs: i64) -> String {
    match period {
        "" | GRAFANA_AUTO => {
            let secs = (interval_ms / 1000).max(MIN_ALIGNMENT_SECS);
            format!("+{secs}s")
        }
        CLOUD_MONITORING_AUTO | STACKDRIVER_AUTO => {
            let secs = if range_secs < 23 * HOUR_SECS {
                60
            } else if range_secs < 6 * DAY_SECS {
                300
            } else {
                3600
            };
            format!("+{secs}s")
        }
        fixed if fixed.starts_with('+') => fixed.to_string(),
        fixed => format!("+{fixed}"),
    }
}

/// The ` | graph_period P` suffix appended to MQL text, if any
///
/// An `auto` or empty period follows the dashboard interval, rounded down to
/// whole seconds and never below one.
pub fn graph_period_suffix(graph_period: Option<&str>, interval_ms: u64) -> Option<String> {
    let period = match graph_period.unwrap_or_default() {
        GRAPH_PERIOD_DISABLED => return None,
        "" | GRAPH_PERIOD_AUTO => format!("{}s", (interval_ms / 1000).max(1)),
        fixed => fixed.to_string(),
    };
    Some(format!(" | graph_period {period}"))
}
