//! Integration tests for query migration
//!
//! Tests that every persisted layout lands in the canonical model and that
//! canonical queries pass through untouched.

mod common;

use common::{load_fixture, load_queries};
use cloudmon_query::migrator::{classify, migrate_all};
use cloudmon_query::{migrate, migrate_value, CanonicalQuery, LegacyShape, PersistedQuery, PreprocessorType, QueryType};
use serde_json::json;

#[test]
fn test_legacy_shapes_are_classified() {
    let queries = load_queries("legacy_queries.json");
    let shapes: Vec<LegacyShape> = queries.iter().map(classify).collect();
    assert_eq!(
        shapes,
        [
            LegacyShape::Flat,
            LegacyShape::Flat,
            LegacyShape::MetricQuery,
            LegacyShape::MetricQuery,
            LegacyShape::SloAlias,
            LegacyShape::Flat,
        ]
    );
}

#[test]
fn test_legacy_queries_migrate_to_expected_types() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));
    let types: Vec<QueryType> = migrated.iter().map(CanonicalQuery::query_type).collect();
    assert_eq!(
        types,
        [
            QueryType::TimeSeriesList,
            QueryType::TimeSeriesList,
            QueryType::TimeSeriesQuery,
            QueryType::TimeSeriesList,
            QueryType::Slo,
            QueryType::Annotation,
        ]
    );
    let ref_ids: Vec<&str> = migrated.iter().map(|q| q.ref_id.as_str()).collect();
    assert_eq!(ref_ids, ["A", "B", "C", "D", "E", "F"]);
}

#[test]
fn test_flat_query_folds_metric_type() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));

    let a = &migrated[0];
    assert_eq!(a.alias_by.as_deref(), Some("testalias"));
    let list = a.time_series_list().unwrap();
    assert_eq!(list.filters(), ["metric.type", "=", "a/metric/type"]);
    assert_eq!(list.view.as_deref(), Some("FULL"));

    let b = migrated[1].time_series_list().unwrap();
    assert_eq!(
        b.filters(),
        [
            "resource.label.zone",
            "=~",
            "$zone",
            "AND",
            "metric.type",
            "=",
            "compute.googleapis.com/instance/cpu/utilization"
        ]
    );
    assert_eq!(b.alignment_period.as_deref(), Some("stackdriver-auto"));
    assert_eq!(b.project_name.as_deref(), Some("my-project"));
    assert!(!b.extra.contains_key("datasource"));
}

#[test]
fn test_legacy_mql_query() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));
    let value = serde_json::to_value(&migrated[2]).unwrap();
    assert_eq!(
        value,
        json!({
            "refId": "C",
            "aliasBy": "mql alias",
            "queryType": "timeSeriesQuery",
            "timeSeriesQuery": {
                "projectName": "my-project",
                "query": "fetch gce_instance::compute.googleapis.com/instance/cpu/utilization",
                "graphPeriod": "disabled"
            }
        })
    );
}

#[test]
fn test_legacy_builder_query_keeps_preprocessor() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));
    let list = migrated[3].time_series_list().unwrap();
    assert_eq!(list.preprocessor_type(), Some(PreprocessorType::Rate));
    assert_eq!(list.group_bys(), ["[[labels]]"]);
    assert_eq!(list.alignment_period.as_deref(), Some("grafana-auto"));
    assert_eq!(migrated[3].alias_by, None);
}

#[test]
fn test_slo_alias_is_lifted() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));
    let slo = &migrated[4];
    assert_eq!(slo.alias_by.as_deref(), Some("{{slo}}"));
    let value = serde_json::to_value(slo).unwrap();
    assert!(value["sloQuery"].get("aliasBy").is_none());
    assert_eq!(value["sloQuery"]["lookbackPeriod"], "1h");
    assert_eq!(value["sloQuery"]["goal"], 0.999);
}

#[test]
fn test_flat_annotation_keeps_templates() {
    let migrated = migrate_all(load_queries("legacy_queries.json"));
    let value = serde_json::to_value(&migrated[5]).unwrap();
    assert_eq!(value["queryType"], "annotation");
    assert_eq!(value["timeSeriesList"]["title"], "{{metric.label.version}}");
    assert_eq!(value["timeSeriesList"]["text"], "{{metric.value}}");
    assert_eq!(
        value["timeSeriesList"]["filters"],
        json!(["metric.type", "=", "logging.googleapis.com/user/deployments"])
    );
}

#[test]
fn test_canonical_queries_pass_through() {
    let fixture = load_fixture("canonical_queries.json");
    let queries = fixture.as_array().unwrap();
    for query in queries {
        let migrated = migrate_value(query.clone()).unwrap();
        assert_eq!(&serde_json::to_value(&migrated).unwrap(), query);
    }
}

#[test]
fn test_empty_preprocessor_passes_through() {
    let query = json!({
        "refId": "A",
        "queryType": "timeSeriesList",
        "timeSeriesList": {"filters": ["metric.type", "=", "m"], "preprocessor": "", "view": "FULL"}
    });
    let migrated = migrate_value(query.clone()).unwrap();
    let list = migrated.time_series_list().unwrap();
    assert_eq!(list.preprocessor.as_deref(), Some(""));
    assert_eq!(list.preprocessor_type(), None);
    assert_eq!(serde_json::to_value(&migrated).unwrap(), query);

    let fixture = load_fixture("canonical_queries.json");
    let from_fixture = migrate_value(fixture[0].clone()).unwrap();
    assert_eq!(from_fixture.time_series_list().unwrap().preprocessor.as_deref(), Some(""));
}

#[test]
fn test_canonical_serialization_is_stable() {
    let fixture = load_fixture("canonical_queries.json");
    for query in fixture.as_array().unwrap() {
        let text = serde_json::to_string(&migrate_value(query.clone()).unwrap()).unwrap();
        let again = serde_json::to_string(&migrate_value(serde_json::from_str(&text).unwrap()).unwrap()).unwrap();
        assert_eq!(again, text);
    }
}

#[test]
fn test_migration_is_idempotent() {
    for query in migrate_all(load_queries("legacy_queries.json")) {
        let persisted = PersistedQuery::from(query.clone());
        assert_eq!(migrate(persisted), query, "ref {}", query.ref_id);
    }
}
