//! Static option tables
//!
//! Entries are kept in the order the backend documents them; lookups preserve
//! that order.

use serde::Serialize;

use crate::model::{MetricKind, PreprocessorType, ValueType};

/// An aligner or reducer and the metrics it may be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionOption {
    pub label: &'static str,
    pub value: &'static str,
    pub valid_value_types: &'static [ValueType],
    pub valid_metric_kinds: &'static [MetricKind],
}

impl FunctionOption {
    /// Whether the option is legal for a metric of this value type and kind
    pub fn supports(&self, value_type: ValueType, metric_kind: MetricKind) -> bool {
        self.valid_value_types.contains(&value_type) && self.valid_metric_kinds.contains(&metric_kind)
    }
}

pub type AlignmentOption = FunctionOption;
pub type AggregationOption = FunctionOption;

use MetricKind::{Cumulative, Delta, Gauge};
use ValueType::{Bool, Distribution, Double, Int64, Money, String as Str};

const NUMERIC: &[ValueType] = &[Int64, Double, Money];
const NUMERIC_DIST: &[ValueType] = &[Int64, Double, Money, Distribution];
const GAUGE_DELTA: &[MetricKind] = &[Gauge, Delta];

const fn option(
    label: &'static str,
    value: &'static str,
    valid_value_types: &'static [ValueType],
    valid_metric_kinds: &'static [MetricKind],
) -> FunctionOption {
    FunctionOption {
        label,
        value,
        valid_value_types,
        valid_metric_kinds,
    }
}

/// Fallback aligner when nothing in [`ALIGNMENTS`] fits
pub const DEFAULT_ALIGNER: &str = "ALIGN_MEAN";
/// Fallback reducer
pub const DEFAULT_REDUCER: &str = "REDUCE_NONE";

pub static ALIGNMENTS: [AlignmentOption; 18] = [
    option("delta", "ALIGN_DELTA", NUMERIC_DIST, &[Cumulative, Delta]),
    option("rate", "ALIGN_RATE", NUMERIC, &[Cumulative, Delta]),
    option("interpolate", "ALIGN_INTERPOLATE", NUMERIC, &[Gauge]),
    option(
        "next older",
        "ALIGN_NEXT_OLDER",
        &[Int64, Double, Money, Distribution, Str, ValueType::Unspecified, Bool],
        &[Gauge],
    ),
    option("min", "ALIGN_MIN", NUMERIC, GAUGE_DELTA),
    option("max", "ALIGN_MAX", NUMERIC, GAUGE_DELTA),
    option("mean", "ALIGN_MEAN", NUMERIC, GAUGE_DELTA),
    option("count", "ALIGN_COUNT", &[Int64, Double, Money, Bool], GAUGE_DELTA),
    option("sum", "ALIGN_SUM", NUMERIC_DIST, GAUGE_DELTA),
    option("stddev", "ALIGN_STDDEV", NUMERIC, GAUGE_DELTA),
    option("count true", "ALIGN_COUNT_TRUE", &[Bool], GAUGE_DELTA),
    option("count false", "ALIGN_COUNT_FALSE", &[Bool], GAUGE_DELTA),
    option("fraction true", "ALIGN_FRACTION_TRUE", &[Bool], GAUGE_DELTA),
    option("percentile 99", "ALIGN_PERCENTILE_99", &[Distribution], GAUGE_DELTA),
    option("percentile 95", "ALIGN_PERCENTILE_95", &[Distribution], GAUGE_DELTA),
    option("percentile 50", "ALIGN_PERCENTILE_50", &[Distribution], GAUGE_DELTA),
    option("percentile 05", "ALIGN_PERCENTILE_05", &[Distribution], GAUGE_DELTA),
    option("percent change", "ALIGN_PERCENT_CHANGE", NUMERIC, GAUGE_DELTA),
];

pub static AGGREGATIONS: [AggregationOption; 14] = [
    option(
        "none",
        "REDUCE_NONE",
        &[Int64, Double, Money, Distribution, Bool, Str],
        &[Gauge, Delta, Cumulative, MetricKind::Unspecified],
    ),
    option("mean", "REDUCE_MEAN", NUMERIC_DIST, GAUGE_DELTA),
    option("min", "REDUCE_MIN", NUMERIC, GAUGE_DELTA),
    option("max", "REDUCE_MAX", NUMERIC, GAUGE_DELTA),
    option("sum", "REDUCE_SUM", NUMERIC_DIST, GAUGE_DELTA),
    option("std. dev.", "REDUCE_STDDEV", NUMERIC_DIST, GAUGE_DELTA),
    option("count", "REDUCE_COUNT", &[Int64, Double, Money, Bool, Str, Distribution], GAUGE_DELTA),
    option("count true", "REDUCE_COUNT_TRUE", &[Bool], GAUGE_DELTA),
    option("count false", "REDUCE_COUNT_FALSE", &[Bool], GAUGE_DELTA),
    option("count fraction true", "REDUCE_FRACTION_TRUE", &[Bool], GAUGE_DELTA),
    option("99th percentile", "REDUCE_PERCENTILE_99", NUMERIC_DIST, GAUGE_DELTA),
    option("95th percentile", "REDUCE_PERCENTILE_95", NUMERIC_DIST, GAUGE_DELTA),
    option("50th percentile", "REDUCE_PERCENTILE_50", NUMERIC_DIST, GAUGE_DELTA),
    option("5th percentile", "REDUCE_PERCENTILE_05", NUMERIC_DIST, GAUGE_DELTA),
];

/// A preprocessor offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreprocessorOption {
    pub label: &'static str,
    pub value: PreprocessorType,
    pub description: &'static str,
}

pub static PREPROCESSORS: [PreprocessorOption; 3] = [
    PreprocessorOption {
        label: "None",
        value: PreprocessorType::None,
        description: "Preprocessing is not applied",
    },
    PreprocessorOption {
        label: "Rate",
        value: PreprocessorType::Rate,
        description: "Data points are aligned and converted to a rate per time series",
    },
    PreprocessorOption {
        label: "Delta",
        value: PreprocessorType::Delta,
        description: "Data points are aligned by their delta (difference) per time series",
    },
];

/// A selectable alignment period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignmentPeriod {
    pub label: &'static str,
    pub value: &'static str,
    /// Kept for old dashboards, not offered for new queries
    pub hidden: bool,
}

const fn period(label: &'static str, value: &'static str) -> AlignmentPeriod {
    AlignmentPeriod {
        label,
        value,
        hidden: false,
    }
}

pub const GRAFANA_AUTO: &str = "grafana-auto";
pub const CLOUD_MONITORING_AUTO: &str = "cloud-monitoring-auto";
pub const STACKDRIVER_AUTO: &str = "stackdriver-auto";

pub static ALIGNMENT_PERIODS: [AlignmentPeriod; 14] = [
    period("grafana auto", GRAFANA_AUTO),
    AlignmentPeriod {
        label: "stackdriver auto",
        value: STACKDRIVER_AUTO,
        hidden: true,
    },
    period("cloud monitoring auto", CLOUD_MONITORING_AUTO),
    period("1m", "+60s"),
    period("2m", "+120s"),
    period("5m", "+300s"),
    period("10m", "+600s"),
    period("30m", "+1800s"),
    period("1h", "+3600s"),
    period("3h", "+10800s"),
    period("6h", "+21600s"),
    period("1d", "+86400s"),
    period("3d", "+259200s"),
    period("1w", "+604800s"),
];

/// An SLO time series selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SloSelector {
    pub label: &'static str,
    pub value: &'static str,
}

pub const SLO_HEALTH_SELECTOR_NAME: &str = "select_slo_health";
pub const SLO_BURN_RATE_SELECTOR_NAME: &str = "select_slo_burn_rate";

pub static SLO_SELECTORS: [SloSelector; 4] = [
    SloSelector {
        label: "SLI Value",
        value: SLO_HEALTH_SELECTOR_NAME,
    },
    SloSelector {
        label: "SLO Compliance",
        value: "select_slo_compliance",
    },
    SloSelector {
        label: "SLO Error Budget Remaining",
        value: "select_slo_budget_fraction",
    },
    SloSelector {
        label: "SLO Burn Rate",
        value: SLO_BURN_RATE_SELECTOR_NAME,
    },
];

/// Labels every metric can be grouped by
pub static SYSTEM_LABELS: [&str; 10] = [
    "metadata.system_labels.cloud_account",
    "metadata.system_labels.name",
    "metadata.system_labels.region",
    "metadata.system_labels.state",
    "metadata.system_labels.instance_group",
    "metadata.system_labels.node_name",
    "metadata.system_labels.service_name",
    "metadata.system_labels.top_level_controller_type",
    "metadata.system_labels.top_level_controller_name",
    "metadata.system_labels.container_image",
];
