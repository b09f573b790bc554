//! Integration tests for backend request construction
//!
//! Tests the full pipeline: persisted JSON → migrate → apply → request.

mod common;

use common::{load_fixture, load_queries, load_settings, request_context};
use cloudmon_query::discovery::MONITORING_BASE_URL;
use cloudmon_query::request::{calculate_alignment_period, interpolate_filter_wildcards};
use cloudmon_query::{
    build_request, migrate, migrate_value, CanonicalQuery, CloudMonitoringRequest, QueryApplier, ScopedVars,
    TemplateVariable, TemplateVariables,
};
use serde_json::json;

fn applier() -> QueryApplier {
    let variables = TemplateVariables::new()
        .with(TemplateVariable::new("zone", vec!["us-central1-a", "us-central1-b"]))
        .with(TemplateVariable::new("labels", vec!["metric.label.instance_name"]))
        .with(TemplateVariable::new("url_map", "frontend"));
    QueryApplier::new(load_settings("datasource.yaml"), variables)
}

fn canonical(value: serde_json::Value) -> CanonicalQuery {
    migrate_value(value).unwrap()
}

fn build(value: serde_json::Value) -> CloudMonitoringRequest {
    let query = applier().apply(&canonical(value), &ScopedVars::new());
    build_request(&query, &request_context()).unwrap()
}

#[test]
fn test_deprecated_flat_query() {
    let request = build(json!({
        "refId": "A",
        "metricType": "a/metric/type",
        "view": "FULL",
        "aliasBy": "testalias",
        "type": "timeSeriesQuery"
    }));
    assert_eq!(request.ref_id(), "A");
    assert_eq!(request.alias_by(), Some("testalias"));
    assert_eq!(request.project_name(), "default-project");
    let params = request.params().unwrap();
    assert_eq!(
        params.encode(),
        "aggregation.alignmentPeriod=%2B60s&aggregation.crossSeriesReducer=REDUCE_NONE&aggregation.perSeriesAligner=ALIGN_MEAN&filter=metric.type%3D%22a%2Fmetric%2Ftype%22&interval.endTime=2018-03-15T13%3A34%3A00Z&interval.startTime=2018-03-15T13%3A00%3A00Z&view=FULL"
    );
    assert_eq!(params.len(), 7);
    assert_eq!(params.get("interval.startTime"), Some("2018-03-15T13:00:00Z"));
    assert_eq!(params.get("filter"), Some("metric.type=\"a/metric/type\""));
}

#[test]
fn test_deprecated_query_with_reducer() {
    let request = build(json!({
        "refId": "A",
        "metricType": "a/metric/type",
        "crossSeriesReducer": "REDUCE_SUM",
        "view": "FULL"
    }));
    assert_eq!(
        request.params().unwrap().encode(),
        "aggregation.alignmentPeriod=%2B60s&aggregation.crossSeriesReducer=REDUCE_SUM&aggregation.perSeriesAligner=ALIGN_MEAN&filter=metric.type%3D%22a%2Fmetric%2Ftype%22&interval.endTime=2018-03-15T13%3A34%3A00Z&interval.startTime=2018-03-15T13%3A00%3A00Z&view=FULL"
    );
}

#[test]
fn test_deprecated_query_with_group_bys() {
    let request = build(json!({
        "refId": "A",
        "metricType": "a/metric/type",
        "crossSeriesReducer": "REDUCE_NONE",
        "groupBys": ["metric.label.group1", "metric.label.group2"],
        "view": "FULL"
    }));
    let params = request.params().unwrap();
    assert_eq!(
        params.encode(),
        "aggregation.alignmentPeriod=%2B60s&aggregation.crossSeriesReducer=REDUCE_NONE&aggregation.groupByFields=metric.label.group1&aggregation.groupByFields=metric.label.group2&aggregation.perSeriesAligner=ALIGN_MEAN&filter=metric.type%3D%22a%2Fmetric%2Ftype%22&interval.endTime=2018-03-15T13%3A34%3A00Z&interval.startTime=2018-03-15T13%3A00%3A00Z&view=FULL"
    );
    assert_eq!(params.len(), 7);
    assert_eq!(params.get_all("aggregation.groupByFields"), ["metric.label.group1", "metric.label.group2"]);
}

#[test]
fn test_preprocessor_on_deprecated_query() {
    let request = build(json!({
        "refId": "A",
        "metricType": "a/metric/type",
        "crossSeriesReducer": "REDUCE_SUM",
        "perSeriesAligner": "REDUCE_MIN",
        "alignmentPeriod": "+60s",
        "groupBys": ["labelname"],
        "view": "FULL",
        "preprocessor": "rate"
    }));
    let params = request.params().unwrap();
    assert_eq!(params.get("aggregation.crossSeriesReducer"), Some("REDUCE_SUM"));
    assert_eq!(params.get("aggregation.perSeriesAligner"), Some("ALIGN_RATE"));
    assert_eq!(params.get("aggregation.alignmentPeriod"), Some("+60s"));
    assert_eq!(params.get("aggregation.groupByFields"), Some("labelname"));
    assert_eq!(params.get("secondaryAggregation.crossSeriesReducer"), Some("REDUCE_SUM"));
    assert_eq!(params.get("secondaryAggregation.perSeriesAligner"), Some("REDUCE_MIN"));
    assert_eq!(params.get("secondaryAggregation.alignmentPeriod"), Some("+60s"));
    assert_eq!(params.get("secondaryAggregation.groupByFields"), Some("labelname"));
}

#[test]
fn test_legacy_panel_to_requests() {
    let applier = applier();
    let queries: Vec<CanonicalQuery> = load_queries("legacy_queries.json").into_iter().map(migrate).collect();
    let requests = applier
        .build_requests(&queries, &ScopedVars::new(), &request_context())
        .unwrap();

    let ref_ids: Vec<&str> = requests.iter().map(CloudMonitoringRequest::ref_id).collect();
    assert_eq!(ref_ids, ["A", "B", "C", "D", "E", "F"]);

    let regex = requests[1].params().unwrap();
    assert_eq!(
        regex.get("filter"),
        Some(r#"resource.label.zone=monitoring.regex.full_match("(us-central1-a|us-central1-b)") metric.type="compute.googleapis.com/instance/cpu/utilization""#)
    );
    assert_eq!(regex.get("aggregation.alignmentPeriod"), Some("+60s"));

    assert_eq!(
        requests[2],
        CloudMonitoringRequest::TimeSeriesQuery {
            ref_id: "C".into(),
            alias_by: Some("mql alias".into()),
            project_name: "my-project".into(),
            query: "fetch gce_instance::compute.googleapis.com/instance/cpu/utilization".into(),
        }
    );

    let rate = requests[3].params().unwrap();
    assert_eq!(rate.get("aggregation.perSeriesAligner"), Some("ALIGN_RATE"));
    assert_eq!(rate.get("secondaryAggregation.perSeriesAligner"), Some("ALIGN_DELTA"));
    assert_eq!(rate.get("aggregation.groupByFields"), Some("metric.label.instance_name"));

    let slo = requests[4].params().unwrap();
    assert_eq!(
        slo.get("filter"),
        Some(r#"select_slo_burn_rate("projects/my-project/services/checkout/serviceLevelObjectives/availability", "1h")"#)
    );
    assert_eq!(slo.get("aggregation.perSeriesAligner"), Some("ALIGN_NEXT_OLDER"));
    assert_eq!(requests[4].alias_by(), Some("{{slo}}"));

    assert_eq!(requests[5].path(), "my-project/timeSeries");
}

#[test]
fn test_canonical_panel_skips_hidden_queries() {
    let queries: Vec<CanonicalQuery> = load_fixture("canonical_queries.json")
        .as_array()
        .unwrap()
        .iter()
        .map(|q| canonical(q.clone()))
        .collect();
    let requests = applier()
        .build_requests(&queries, &ScopedVars::new(), &request_context())
        .unwrap();

    let ref_ids: Vec<&str> = requests.iter().map(CloudMonitoringRequest::ref_id).collect();
    assert_eq!(ref_ids, ["A", "C", "D"]);

    // an empty preprocessor is no preprocessor
    let list = requests[0].params().unwrap();
    assert_eq!(list.get("aggregation.perSeriesAligner"), Some("ALIGN_MEAN"));
    assert!(!list.contains_key("secondaryAggregation.perSeriesAligner"));

    let slo = requests[1].params().unwrap();
    assert_eq!(slo.get("aggregation.alignmentPeriod"), Some("+60s"));
    assert_eq!(slo.get("aggregation.perSeriesAligner"), Some("ALIGN_MEAN"));
}

#[test]
fn test_request_urls() {
    let request = build(json!({
        "refId": "A",
        "queryType": "timeSeriesQuery",
        "timeSeriesQuery": {"projectName": "p", "query": "fetch x", "graphPeriod": "1m"}
    }));
    assert_eq!(request.url(MONITORING_BASE_URL), "cloudmonitoring/v3/projects/p/timeSeries:query");
    assert_eq!(request.body(), Some(json!({"query": "fetch x | graph_period 1m"})));

    let list = build(json!({"refId": "B", "metricType": "m"}));
    let url = list.url(MONITORING_BASE_URL);
    assert!(url.starts_with("cloudmonitoring/v3/projects/default-project/timeSeries?aggregation.alignmentPeriod="));
}

#[test]
fn test_alignment_period_table() {
    let hour = 3600;
    let cases = [
        ("grafana-auto", 1000, hour, "+60s"),
        ("grafana-auto", 300_000, hour, "+300s"),
        ("cloud-monitoring-auto", 1000, 2 * hour, "+60s"),
        ("cloud-monitoring-auto", 1000, 3 * 24 * hour, "+300s"),
        ("stackdriver-auto", 1000, 7 * 24 * hour, "+3600s"),
        ("+600s", 1000, hour, "+600s"),
        ("+10800s", 1000, hour, "+10800s"),
    ];
    for (period, interval_ms, range, expected) in cases {
        assert_eq!(calculate_alignment_period(period, interval_ms, range), expected, "{period}");
    }
}

#[test]
fn test_wildcard_filters() {
    assert_eq!(interpolate_filter_wildcards("*-central1*"), r#"has_substring("-central1")"#);
    assert_eq!(interpolate_filter_wildcards("us-ce*tral1-b"), r#"monitoring.regex.full_match("^us\\-ce.*tral1\\-b$")"#);

    let request = build(json!({
        "refId": "A",
        "queryType": "timeSeriesList",
        "timeSeriesList": {"filters": ["metric.type", "=", "m", "AND", "resource.label.zone", "=", "*-central1"]}
    }));
    assert_eq!(
        request.params().unwrap().get("filter"),
        Some(r#"metric.type="m" resource.label.zone=ends_with("-central1")"#)
    );
}
