//! Persisted query shapes
//!
//! Dashboards saved by older versions store queries in several layouts. A
//! [`PersistedQuery`] is a typed view over all of them: every known key is an
//! optional field and whatever is left stays in `rest`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::query::{CanonicalQuery, QueryPayload, SloQuery, TimeSeriesList, TimeSeriesQuery};

/// Any persisted query, canonical or not
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    /// `annotationQuery` marks a flat annotation
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(deserialize_with = "lenient_metric_query", skip_serializing_if = "Option::is_none")]
    pub metric_query: Option<LegacyMetricQuery>,
    #[serde(deserialize_with = "lenient_dropping", skip_serializing_if = "Option::is_none")]
    pub slo_query: Option<PersistedSloQuery>,
    #[serde(deserialize_with = "lenient_dropping", skip_serializing_if = "Option::is_none")]
    pub time_series_query: Option<TimeSeriesQuery>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub time_series_list: Option<TimeSeriesList>,
    /// Flat fields of the oldest layout, plus anything unrecognised
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PersistedQuery {
    /// Whether any payload container is present
    pub fn has_payload(&self) -> bool {
        self.metric_query.is_some()
            || self.slo_query.is_some()
            || self.time_series_query.is_some()
            || self.time_series_list.is_some()
    }

    pub fn is_annotation(&self) -> bool {
        self.kind.as_deref() == Some("annotationQuery")
    }
}

/// The intermediate `metricQuery` container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyMetricQuery {
    /// `mql` selects the query language editor, anything else the builder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_series_reducer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_series_aligner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_bys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_by: Option<String>,
    /// Annotation title template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Annotation text template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Known fields that had the wrong type, carried into the list payload
    #[serde(skip)]
    pub mistyped: Map<String, Value>,
}

impl LegacyMetricQuery {
    pub fn is_mql(&self) -> bool {
        self.editor_mode.as_deref() == Some("mql")
    }
}

/// An SLO payload that may still carry its own `aliasBy`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSloQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_by: Option<String>,
    #[serde(flatten)]
    pub query: SloQuery,
}

// ============================================================================
// Lenient payload reading
// ============================================================================

/// Read a JSON object into `T`, setting aside the fields that do not fit
///
/// Each field is tried on its own against `T`; the ones that fail are
/// removed and returned next to the typed value. Non-objects are not split.
pub(crate) fn read_lenient<T: DeserializeOwned>(value: Value) -> Result<(T, Map<String, Value>), serde_json::Error> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => return serde_json::from_value(other).map(|typed| (typed, Map::new())),
    };
    if let Ok(typed) = serde_json::from_value(Value::Object(fields.clone())) {
        return Ok((typed, Map::new()));
    }

    let rejected: Vec<String> = fields
        .iter()
        .filter(|(key, value)| {
            let single = Map::from_iter([((*key).clone(), (*value).clone())]);
            serde_json::from_value::<T>(Value::Object(single)).is_err()
        })
        .map(|(key, _)| key.clone())
        .collect();

    let mut mistyped = Map::new();
    for key in rejected {
        if let Some(value) = fields.remove(&key) {
            mistyped.insert(key, value);
        }
    }
    let typed = serde_json::from_value(Value::Object(fields))?;
    Ok((typed, mistyped))
}

fn lenient<'de, D, T>(deserializer: D, keep: impl FnOnce(&mut T, Map<String, Value>)) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let (mut typed, mistyped) = read_lenient::<T>(value).map_err(serde::de::Error::custom)?;
    if !mistyped.is_empty() {
        tracing::debug!(fields = ?mistyped.keys().collect::<Vec<_>>(), "payload fields with unexpected types");
        keep(&mut typed, mistyped);
    }
    Ok(Some(typed))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TimeSeriesList>, D::Error> {
    lenient(deserializer, |list: &mut TimeSeriesList, mistyped| list.extra.extend(mistyped))
}

fn lenient_metric_query<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<LegacyMetricQuery>, D::Error> {
    lenient(deserializer, |metric: &mut LegacyMetricQuery, mistyped| metric.mistyped = mistyped)
}

// MQL and SLO payloads have nowhere to keep unknown fields
fn lenient_dropping<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    lenient(deserializer, |_: &mut T, _| {})
}

impl From<CanonicalQuery> for PersistedQuery {
    fn from(query: CanonicalQuery) -> Self {
        let mut persisted = PersistedQuery {
            ref_id: Some(query.ref_id),
            query_type: Some(query.payload.query_type().as_str().to_string()),
            alias_by: query.alias_by,
            hide: query.hide,
            interval_ms: query.interval_ms,
            ..Default::default()
        };
        match query.payload {
            QueryPayload::TimeSeriesList { time_series_list } => {
                persisted.time_series_list = Some(time_series_list);
            }
            QueryPayload::TimeSeriesQuery { time_series_query } => {
                persisted.time_series_query = Some(time_series_query);
            }
            QueryPayload::Slo { slo_query } => {
                persisted.slo_query = Some(PersistedSloQuery {
                    alias_by: None,
                    query: slo_query,
                });
            }
            QueryPayload::Annotation { annotation } => {
                let mut list = annotation.list;
                if let Some(title) = annotation.title {
                    list.extra.insert("title".into(), Value::String(title));
                }
                if let Some(text) = annotation.text {
                    list.extra.insert("text".into(), Value::String(text));
                }
                persisted.time_series_list = Some(list);
            }
        }
        persisted
    }
}
