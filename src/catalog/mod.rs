//! Compatibility catalog
//!
//! Static tables of aligners and reducers with the value types and metric
//! kinds the backend accepts them for, plus lookups that keep a query's
//! selections legal when its metric changes.

mod compat;
mod descriptor;
mod tables;

pub use compat::{
    aggregations_for, alignments_for, preprocessor_options_for, resolve_aggregation, resolve_alignment,
    AlignmentResolution,
};
pub use descriptor::{
    extract_services, label_keys, labels_to_grouped_options, metric_types_by_service, select_metric_type,
    MetricTypeSelection,
};
pub use tables::{
    AggregationOption, AlignmentOption, AlignmentPeriod, FunctionOption, PreprocessorOption, SloSelector,
    AGGREGATIONS, ALIGNMENTS, ALIGNMENT_PERIODS, CLOUD_MONITORING_AUTO, DEFAULT_ALIGNER, DEFAULT_REDUCER,
    GRAFANA_AUTO, PREPROCESSORS, SLO_BURN_RATE_SELECTOR_NAME, SLO_HEALTH_SELECTOR_NAME, SLO_SELECTORS,
    STACKDRIVER_AUTO, SYSTEM_LABELS,
};
