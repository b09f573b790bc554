//! Integration tests for the compatibility catalog
//!
//! Tests that option lookups respect the backend's aligner / reducer matrix
//! for every value type and metric kind.

mod common;

use common::load_fixture;
use cloudmon_query::catalog::{
    aggregations_for, alignments_for, extract_services, preprocessor_options_for, resolve_aggregation,
    resolve_alignment, select_metric_type, AGGREGATIONS, ALIGNMENTS,
};
use cloudmon_query::{MetricDescriptor, MetricKind, PreprocessorType, ValueType};

fn descriptors() -> Vec<MetricDescriptor> {
    let fixture = load_fixture("metric_descriptors.json");
    serde_json::from_value::<Vec<MetricDescriptor>>(fixture["metricDescriptors"].clone())
        .unwrap()
        .into_iter()
        .map(MetricDescriptor::with_derived_fields)
        .collect()
}

#[test]
fn test_alignments_contained_in_matrix() {
    for value_type in ValueType::ALL {
        for metric_kind in MetricKind::ALL {
            let options = alignments_for(value_type, metric_kind, None);
            for option in &options {
                assert!(option.valid_value_types.contains(&value_type), "{} for {value_type}", option.value);
                assert!(option.valid_metric_kinds.contains(&metric_kind), "{} for {metric_kind}", option.value);
            }
            let expected = ALIGNMENTS.iter().filter(|o| o.supports(value_type, metric_kind)).count();
            assert_eq!(options.len(), expected);
        }
    }
}

#[test]
fn test_aggregations_contained_in_matrix() {
    for value_type in ValueType::ALL {
        for metric_kind in MetricKind::ALL {
            let options = aggregations_for(value_type, metric_kind);
            for option in &options {
                assert!(option.valid_value_types.contains(&value_type), "{} for {value_type}", option.value);
                assert!(option.valid_metric_kinds.contains(&metric_kind), "{} for {metric_kind}", option.value);
            }
            let expected = AGGREGATIONS.iter().filter(|o| o.supports(value_type, metric_kind)).count();
            assert_eq!(options.len(), expected);
        }
    }
}

#[test]
fn test_rate_override_for_every_value_type() {
    for value_type in ValueType::ALL {
        assert_eq!(
            alignments_for(value_type, MetricKind::Cumulative, Some(PreprocessorType::Rate)),
            alignments_for(value_type, MetricKind::Gauge, None)
        );
    }
}

#[test]
fn test_resolution_always_legal_or_default() {
    for value_type in ValueType::ALL {
        for metric_kind in MetricKind::ALL {
            let resolution = resolve_alignment(value_type, metric_kind, "ALIGN_PERCENT_CHANGE", None);
            if resolution.options.is_empty() {
                assert_eq!(resolution.aligner, "ALIGN_MEAN");
            } else {
                assert!(resolution.options.iter().any(|o| o.value == resolution.aligner));
            }

            let reducer = resolve_aggregation(value_type, metric_kind, "REDUCE_PERCENTILE_99");
            assert!(reducer == "REDUCE_PERCENTILE_99" || reducer == "REDUCE_NONE");
        }
    }
}

#[test]
fn test_preprocessors_for_fixture_metrics() {
    let descriptors = descriptors();
    let counts: Vec<usize> = descriptors
        .iter()
        .map(|d| preprocessor_options_for(Some(d.metric_kind), Some(d.value_type)).len())
        .collect();
    // gauge, delta, delta, cumulative distribution
    assert_eq!(counts, [1, 2, 2, 1]);
}

#[test]
fn test_descriptor_driven_selection() {
    let descriptors = descriptors();
    let services: Vec<&str> = extract_services(&descriptors).iter().map(|d| d.service.as_str()).collect();
    assert_eq!(
        services,
        ["compute.googleapis.com", "loadbalancing.googleapis.com", "logging.googleapis.com"]
    );

    let selection = select_metric_type(
        &descriptors,
        "loadbalancing.googleapis.com/https/request_count",
        "loadbalancing.googleapis.com/https/request_count",
        "compute.googleapis.com",
    );
    assert_eq!(selection.selected, "compute.googleapis.com/instance/cpu/utilization");
    assert_eq!(selection.metric_types.len(), 2);
    assert_eq!(selection.metric_types[1].label, "compute.googleapis.com/instance/cpu/usage_time");

    let usage = &descriptors[1];
    let resolution = resolve_alignment(usage.value_type, usage.metric_kind, "ALIGN_INTERPOLATE", None);
    assert_eq!(resolution.aligner, "ALIGN_DELTA");
}
