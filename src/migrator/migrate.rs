//! Persisted query migration
//!
//! Every layout maps to exactly one canonical query. Migration is total:
//! fields that cannot be read into the canonical model are kept verbatim as
//! unknown list fields rather than rejected.

use serde_json::{Map, Value};

use super::error::MigrateError;
use super::shape::{classify, LegacyShape};
use crate::codec::fold_metric_type;
use crate::model::{
    read_lenient, AnnotationQuery, CanonicalQuery, LegacyMetricQuery, PersistedQuery, QueryPayload, QueryType, TimeSeriesList,
    TimeSeriesQuery,
};

/// `view` given to flat queries that do not set one
pub const DEFAULT_VIEW: &str = "FULL";

/// Flat fields that belonged to the editor, not the query
const DROPPED_FLAT_FIELDS: [&str; 4] = ["datasource", "key", "maxLines", "metric"];

/// Migrate a persisted query of any layout
pub fn migrate(query: PersistedQuery) -> CanonicalQuery {
    let shape = classify(&query);
    if shape != LegacyShape::Canonical {
        tracing::debug!(ref_id = query.ref_id.as_deref().unwrap_or_default(), %shape, "migrating legacy query");
    }

    match shape {
        LegacyShape::Flat => migrate_flat(query),
        LegacyShape::MetricQuery => migrate_metric_query(query),
        LegacyShape::SloAlias => migrate_slo_alias(query),
        LegacyShape::Canonical => migrate_canonical(query),
    }
}

/// Migrate a persisted query from its JSON form
pub fn migrate_value(value: Value) -> Result<CanonicalQuery, MigrateError> {
    let found = match &value {
        Value::Object(_) => None,
        Value::Null => Some("null"),
        Value::Bool(_) => Some("a boolean"),
        Value::Number(_) => Some("a number"),
        Value::String(_) => Some("a string"),
        Value::Array(_) => Some("an array"),
    };
    if let Some(found) = found {
        return Err(MigrateError::NotAnObject { found });
    }

    let persisted: PersistedQuery = serde_json::from_value(value)?;
    Ok(migrate(persisted))
}

/// Migrate every query of a panel
pub fn migrate_all(queries: impl IntoIterator<Item = PersistedQuery>) -> Vec<CanonicalQuery> {
    queries.into_iter().map(migrate).collect()
}

fn envelope(query: &mut PersistedQuery, payload: QueryPayload) -> CanonicalQuery {
    CanonicalQuery {
        ref_id: query.ref_id.take().unwrap_or_default(),
        alias_by: query.alias_by.take(),
        hide: query.hide,
        interval_ms: query.interval_ms,
        payload,
    }
}

fn list_payload(list: TimeSeriesList, annotation: bool) -> QueryPayload {
    if annotation {
        QueryPayload::Annotation {
            annotation: AnnotationQuery::from_list(list),
        }
    } else {
        QueryPayload::TimeSeriesList { time_series_list: list }
    }
}

fn with_metric_type(mut list: TimeSeriesList, metric_type: Option<&str>) -> TimeSeriesList {
    let Some(metric_type) = metric_type.filter(|m| !m.is_empty()) else {
        return list;
    };
    if list.extra.contains_key("filters") {
        // unreadable chain, keep the type beside it
        list.extra.insert("metricType".into(), Value::String(metric_type.to_string()));
    } else {
        list.filters = Some(fold_metric_type(list.filters(), metric_type));
    }
    list
}

fn migrate_flat(mut query: PersistedQuery) -> CanonicalQuery {
    let annotation = query.is_annotation();

    let mut fields = std::mem::take(&mut query.rest);
    for key in DROPPED_FLAT_FIELDS {
        fields.remove(key);
    }
    let metric_type = match fields.remove("metricType") {
        Some(Value::String(metric_type)) => Some(metric_type),
        Some(other) => {
            fields.insert("metricType".into(), other);
            None
        }
        None => None,
    };

    let mut list = read_list(fields);
    if !list.extra.contains_key("view") && list.view.as_deref().map_or(true, str::is_empty) {
        list.view = Some(DEFAULT_VIEW.to_string());
    }
    let list = with_metric_type(list, metric_type.as_deref());

    envelope(&mut query, list_payload(list, annotation))
}

/// Read flat fields into a list payload, keeping fields of an unexpected
/// type as unknown fields
fn read_list(fields: Map<String, Value>) -> TimeSeriesList {
    match read_lenient::<TimeSeriesList>(Value::Object(fields.clone())) {
        Ok((mut list, mistyped)) => {
            if !mistyped.is_empty() {
                tracing::debug!(fields = ?mistyped.keys().collect::<Vec<_>>(), "flat query fields kept verbatim");
            }
            list.extra.extend(mistyped);
            list
        }
        Err(e) => {
            tracing::debug!(error = %e, "flat query fields kept verbatim");
            TimeSeriesList {
                extra: fields,
                ..Default::default()
            }
        }
    }
}

fn migrate_metric_query(mut query: PersistedQuery) -> CanonicalQuery {
    let metric = query.metric_query.take().unwrap_or_default();
    let annotation = query.query_type.as_deref() == Some(QueryType::Annotation.as_str());

    let LegacyMetricQuery {
        editor_mode,
        project_name,
        query: text,
        graph_period,
        metric_type,
        cross_series_reducer,
        alignment_period,
        per_series_aligner,
        group_bys,
        filters,
        view,
        preprocessor,
        alias_by,
        title,
        text: annotation_text,
        mistyped,
    } = metric;

    let payload = if editor_mode.as_deref() == Some("mql") {
        QueryPayload::TimeSeriesQuery {
            time_series_query: TimeSeriesQuery {
                project_name,
                query: text,
                graph_period,
            },
        }
    } else {
        let list = TimeSeriesList {
            project_name,
            cross_series_reducer,
            alignment_period,
            per_series_aligner,
            group_bys,
            filters,
            view,
            preprocessor,
            extra: mistyped,
            ..Default::default()
        };
        let list = with_metric_type(list, metric_type.as_deref());
        if annotation {
            QueryPayload::Annotation {
                annotation: AnnotationQuery {
                    title,
                    text: annotation_text,
                    list,
                },
            }
        } else {
            QueryPayload::TimeSeriesList { time_series_list: list }
        }
    };

    let mut canonical = envelope(&mut query, payload);
    canonical.alias_by = alias_by;
    canonical
}

fn migrate_slo_alias(mut query: PersistedQuery) -> CanonicalQuery {
    let slo = query.slo_query.take().unwrap_or_default();
    let mut canonical = envelope(&mut query, QueryPayload::Slo { slo_query: slo.query });
    canonical.alias_by = slo.alias_by;
    canonical
}

fn migrate_canonical(mut query: PersistedQuery) -> CanonicalQuery {
    let declared = query.query_type.as_deref().and_then(QueryType::from_tag);
    let inferred = || {
        if query.time_series_list.is_some() {
            Some(if query.is_annotation() {
                QueryType::Annotation
            } else {
                QueryType::TimeSeriesList
            })
        } else if query.time_series_query.is_some() {
            Some(QueryType::TimeSeriesQuery)
        } else if query.slo_query.is_some() {
            Some(QueryType::Slo)
        } else {
            None
        }
    };

    let Some(query_type) = declared.or_else(inferred) else {
        // only a metricQuery under an unrecognised tag
        return migrate_metric_query(query);
    };

    let payload = match query_type {
        QueryType::TimeSeriesList | QueryType::Annotation => {
            let list = query.time_series_list.take().unwrap_or_default();
            list_payload(list, query_type == QueryType::Annotation)
        }
        QueryType::TimeSeriesQuery => QueryPayload::TimeSeriesQuery {
            time_series_query: query.time_series_query.take().unwrap_or_default(),
        },
        QueryType::Slo => {
            let slo = query.slo_query.take().unwrap_or_default();
            if query.alias_by.is_none() {
                query.alias_by = slo.alias_by;
            }
            QueryPayload::Slo { slo_query: slo.query }
        }
    };

    envelope(&mut query, payload)
}
