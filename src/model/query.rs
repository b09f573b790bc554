//! Canonical query model
//!
//! Every persisted query is migrated into a [`CanonicalQuery`]. The payload is
//! a tagged union on `queryType`, so exactly one of `timeSeriesList`,
//! `timeSeriesQuery` or `sloQuery` is ever present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::metric::PreprocessorType;

/// Discriminator of the canonical payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    #[serde(rename = "timeSeriesList")]
    TimeSeriesList,
    #[serde(rename = "timeSeriesQuery")]
    TimeSeriesQuery,
    #[serde(rename = "slo")]
    Slo,
    #[serde(rename = "annotation")]
    Annotation,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::TimeSeriesList => "timeSeriesList",
            QueryType::TimeSeriesQuery => "timeSeriesQuery",
            QueryType::Slo => "slo",
            QueryType::Annotation => "annotation",
        }
    }

    /// Look up a persisted `queryType` tag. Legacy tags (`metrics`) are not
    /// canonical and return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "timeSeriesList" => Some(QueryType::TimeSeriesList),
            "timeSeriesQuery" => Some(QueryType::TimeSeriesQuery),
            "slo" => Some(QueryType::Slo),
            "annotation" => Some(QueryType::Annotation),
            _ => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder-mode query against the time series list API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSeriesList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_series_reducer: Option<String>,
    /// Opaque period string (`grafana-auto`, `cloud-monitoring-auto`, `+60s`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_series_aligner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_bys: Option<Vec<String>>,
    /// Flat filter chain, see [`crate::codec`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Kept as written; read through [`TimeSeriesList::preprocessor_type`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_alignment_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_cross_series_reducer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_per_series_aligner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_group_bys: Option<Vec<String>>,
    /// Fields this model does not know about, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeSeriesList {
    /// The filter chain, empty when unset
    pub fn filters(&self) -> &[String] {
        self.filters.as_deref().unwrap_or_default()
    }

    /// The group-by fields, empty when unset
    pub fn group_bys(&self) -> &[String] {
        self.group_bys.as_deref().unwrap_or_default()
    }

    /// The preprocessor, `None` when unset or not a known name (saved
    /// dashboards may carry `""`)
    pub fn preprocessor_type(&self) -> Option<PreprocessorType> {
        self.preprocessor.as_deref().and_then(|p| p.parse().ok())
    }
}

/// MQL query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSeriesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// `auto`, `disabled` or a duration such as `1m`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_period: Option<String>,
}

/// Service level objective query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SloQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_series_aligner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback_period: Option<String>,
}

/// Annotation query: a time series list with title and text templates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub list: TimeSeriesList,
}

impl AnnotationQuery {
    /// Split `title` and `text` out of a list payload's unknown fields
    pub fn from_list(mut list: TimeSeriesList) -> Self {
        let mut take = |key: &str| match list.extra.remove(key) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                list.extra.insert(key.to_string(), other);
                None
            }
            None => None,
        };
        let title = take("title");
        let text = take("text");
        Self { title, text, list }
    }
}

/// Payload of a canonical query, tagged by `queryType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "queryType")]
pub enum QueryPayload {
    #[serde(rename = "timeSeriesList")]
    TimeSeriesList {
        #[serde(rename = "timeSeriesList")]
        time_series_list: TimeSeriesList,
    },
    #[serde(rename = "timeSeriesQuery")]
    TimeSeriesQuery {
        #[serde(rename = "timeSeriesQuery")]
        time_series_query: TimeSeriesQuery,
    },
    #[serde(rename = "slo")]
    Slo {
        #[serde(rename = "sloQuery")]
        slo_query: SloQuery,
    },
    #[serde(rename = "annotation")]
    Annotation {
        #[serde(rename = "timeSeriesList")]
        annotation: AnnotationQuery,
    },
}

impl QueryPayload {
    pub fn query_type(&self) -> QueryType {
        match self {
            QueryPayload::TimeSeriesList { .. } => QueryType::TimeSeriesList,
            QueryPayload::TimeSeriesQuery { .. } => QueryType::TimeSeriesQuery,
            QueryPayload::Slo { .. } => QueryType::Slo,
            QueryPayload::Annotation { .. } => QueryType::Annotation,
        }
    }

    /// An empty payload of the given type
    pub fn empty(query_type: QueryType) -> Self {
        match query_type {
            QueryType::TimeSeriesList => QueryPayload::TimeSeriesList {
                time_series_list: TimeSeriesList::default(),
            },
            QueryType::TimeSeriesQuery => QueryPayload::TimeSeriesQuery {
                time_series_query: TimeSeriesQuery::default(),
            },
            QueryType::Slo => QueryPayload::Slo {
                slo_query: SloQuery::default(),
            },
            QueryType::Annotation => QueryPayload::Annotation {
                annotation: AnnotationQuery::default(),
            },
        }
    }
}

/// A query in the one shape every other component works with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalQuery {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(flatten)]
    pub payload: QueryPayload,
}

impl CanonicalQuery {
    pub fn new(ref_id: impl Into<String>, payload: QueryPayload) -> Self {
        Self {
            ref_id: ref_id.into(),
            alias_by: None,
            hide: None,
            interval_ms: None,
            payload,
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.payload.query_type()
    }

    /// The list payload of a time series list or annotation query
    pub fn time_series_list(&self) -> Option<&TimeSeriesList> {
        match &self.payload {
            QueryPayload::TimeSeriesList { time_series_list } => Some(time_series_list),
            QueryPayload::Annotation { annotation } => Some(&annotation.list),
            _ => None,
        }
    }

    pub fn time_series_list_mut(&mut self) -> Option<&mut TimeSeriesList> {
        match &mut self.payload {
            QueryPayload::TimeSeriesList { time_series_list } => Some(time_series_list),
            QueryPayload::Annotation { annotation } => Some(&mut annotation.list),
            _ => None,
        }
    }

    pub fn time_series_query(&self) -> Option<&TimeSeriesQuery> {
        match &self.payload {
            QueryPayload::TimeSeriesQuery { time_series_query } => Some(time_series_query),
            _ => None,
        }
    }

    pub fn slo_query(&self) -> Option<&SloQuery> {
        match &self.payload {
            QueryPayload::Slo { slo_query } => Some(slo_query),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_type_tags() {
        assert_eq!(QueryType::from_tag("timeSeriesList"), Some(QueryType::TimeSeriesList));
        assert_eq!(QueryType::from_tag("slo"), Some(QueryType::Slo));
        assert_eq!(QueryType::from_tag("metrics"), None);
        assert_eq!(QueryType::Annotation.to_string(), "annotation");
    }

    #[test]
    fn test_serialize_list_query() {
        let query = CanonicalQuery::new(
            "B",
            QueryPayload::TimeSeriesList {
                time_series_list: TimeSeriesList {
                    project_name: Some("p2".into()),
                    filters: Some(vec!["metric.type".into(), "=".into(), "cpu".into()]),
                    view: Some("FULL".into()),
                    ..Default::default()
                },
            },
        );
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "refId": "B",
                "queryType": "timeSeriesList",
                "timeSeriesList": {
                    "projectName": "p2",
                    "filters": ["metric.type", "=", "cpu"],
                    "view": "FULL"
                }
            })
        );
    }

    #[test]
    fn test_deserialize_slo_query() {
        let query: CanonicalQuery = serde_json::from_value(json!({
            "refId": "C",
            "queryType": "slo",
            "aliasBy": "{{slo}}",
            "sloQuery": {"projectName": "p", "selectorName": "select_slo_health", "goal": 0.99}
        }))
        .unwrap();
        assert_eq!(query.query_type(), QueryType::Slo);
        assert_eq!(query.alias_by.as_deref(), Some("{{slo}}"));
        let slo = query.slo_query().unwrap();
        assert_eq!(slo.goal, Some(0.99));
        assert_eq!(slo.selector_name.as_deref(), Some("select_slo_health"));
    }

    #[test]
    fn test_unknown_list_fields_are_kept() {
        let value = json!({
            "refId": "A",
            "queryType": "timeSeriesList",
            "timeSeriesList": {"projectName": "p", "unit": "By", "valueType": "INT64"}
        });
        let query: CanonicalQuery = serde_json::from_value(value.clone()).unwrap();
        let list = query.time_series_list().unwrap();
        assert_eq!(list.extra.get("unit"), Some(&json!("By")));
        assert_eq!(serde_json::to_value(&query).unwrap(), value);
    }

    #[test]
    fn test_annotation_title_and_text() {
        let mut list = TimeSeriesList::default();
        list.extra.insert("title".into(), json!("{{metric.label.instance_name}}"));
        list.extra.insert("text".into(), json!("value {{metric.value}}"));
        let annotation = AnnotationQuery::from_list(list);
        assert_eq!(annotation.title.as_deref(), Some("{{metric.label.instance_name}}"));
        assert_eq!(annotation.text.as_deref(), Some("value {{metric.value}}"));
        assert!(annotation.list.extra.is_empty());

        let query = CanonicalQuery::new("A", QueryPayload::Annotation { annotation });
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["queryType"], "annotation");
        assert_eq!(value["timeSeriesList"]["title"], "{{metric.label.instance_name}}");
        assert!(query.time_series_list().is_some());
    }
}
