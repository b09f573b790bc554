//! Persisted shape classification

use std::fmt;

use crate::model::PersistedQuery;

/// Layouts a persisted query may be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyShape {
    /// Oldest layout: metric fields directly on the query, no payload container
    Flat,
    /// A `metricQuery` container tagged `metrics` (or untagged) or `annotation`
    MetricQuery,
    /// An SLO query whose `sloQuery` still carries `aliasBy`
    SloAlias,
    /// Already canonical
    Canonical,
}

impl LegacyShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyShape::Flat => "flat",
            LegacyShape::MetricQuery => "metricQuery",
            LegacyShape::SloAlias => "sloAlias",
            LegacyShape::Canonical => "canonical",
        }
    }
}

impl fmt::Display for LegacyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy `queryType` of builder and MQL queries
pub const METRICS_QUERY_TYPE: &str = "metrics";

/// Decide which layout `query` is stored in
///
/// Only the presence of the payload containers and the `queryType` tag are
/// consulted; old dashboards carry no other version marker.
pub fn classify(query: &PersistedQuery) -> LegacyShape {
    if !query.has_payload() {
        return LegacyShape::Flat;
    }

    let tag = query.query_type.as_deref();

    if query.metric_query.is_some() && matches!(tag, None | Some(METRICS_QUERY_TYPE) | Some("annotation")) {
        return LegacyShape::MetricQuery;
    }

    let nested_alias = query.slo_query.as_ref().is_some_and(|slo| slo.alias_by.is_some());
    if tag == Some("slo") && nested_alias {
        return LegacyShape::SloAlias;
    }

    LegacyShape::Canonical
}
