//! Compatibility lookups over the option tables

use serde::Serialize;

use super::tables::{
    AggregationOption, AlignmentOption, PreprocessorOption, AGGREGATIONS, ALIGNMENTS, DEFAULT_ALIGNER,
    DEFAULT_REDUCER, PREPROCESSORS,
};
use crate::model::{MetricKind, PreprocessorType, ValueType};

/// Aligners legal for a metric
///
/// A rate preprocessor turns the series into a gauge before alignment, so
/// the gauge column applies whatever the metric's own kind.
pub fn alignments_for(
    value_type: ValueType,
    metric_kind: MetricKind,
    preprocessor: Option<PreprocessorType>,
) -> Vec<&'static AlignmentOption> {
    let metric_kind = match preprocessor {
        Some(PreprocessorType::Rate) => MetricKind::Gauge,
        _ => metric_kind,
    };
    ALIGNMENTS
        .iter()
        .filter(|option| option.supports(value_type, metric_kind))
        .collect()
}

/// Reducers legal for a metric
pub fn aggregations_for(value_type: ValueType, metric_kind: MetricKind) -> Vec<&'static AggregationOption> {
    AGGREGATIONS
        .iter()
        .filter(|option| option.supports(value_type, metric_kind))
        .collect()
}

/// Legal aligners together with the one to use
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResolution {
    pub options: Vec<&'static AlignmentOption>,
    pub aligner: String,
}

/// Keep `current` when it is legal, otherwise pick the first legal aligner
pub fn resolve_alignment(
    value_type: ValueType,
    metric_kind: MetricKind,
    current: &str,
    preprocessor: Option<PreprocessorType>,
) -> AlignmentResolution {
    let options = alignments_for(value_type, metric_kind, preprocessor);
    let aligner = if options.iter().any(|option| option.value == current) {
        current.to_string()
    } else {
        let fallback = options.first().map(|option| option.value).unwrap_or(DEFAULT_ALIGNER);
        tracing::debug!(
            current,
            fallback,
            value_type = %value_type,
            metric_kind = %metric_kind,
            "aligner not valid for metric, falling back"
        );
        fallback.to_string()
    };
    AlignmentResolution { options, aligner }
}

/// Keep `current` when it is a legal reducer, otherwise `REDUCE_NONE`
pub fn resolve_aggregation(value_type: ValueType, metric_kind: MetricKind, current: &str) -> String {
    if aggregations_for(value_type, metric_kind)
        .iter()
        .any(|option| option.value == current)
    {
        return current.to_string();
    }
    tracing::debug!(current, value_type = %value_type, metric_kind = %metric_kind, "reducer not valid for metric, falling back");
    DEFAULT_REDUCER.to_string()
}

/// Preprocessors that make sense for a metric
pub fn preprocessor_options_for(
    metric_kind: Option<MetricKind>,
    value_type: Option<ValueType>,
) -> Vec<&'static PreprocessorOption> {
    let count = match (metric_kind, value_type) {
        (_, Some(ValueType::Distribution)) | (Some(MetricKind::Gauge), _) | (None, _) => 1,
        (Some(MetricKind::Cumulative), _) => 3,
        _ => 2,
    };
    PREPROCESSORS.iter().take(count).collect()
}
