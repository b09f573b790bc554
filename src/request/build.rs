//! Backend request construction

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::error::RequestError;
use super::filter::{build_filter_string, build_slo_filter};
use super::params::QueryParams;
use super::period::{calculate_alignment_period, graph_period_suffix};
use crate::catalog::{DEFAULT_ALIGNER, DEFAULT_REDUCER, SLO_HEALTH_SELECTOR_NAME};
use crate::migrator::DEFAULT_VIEW;
use crate::model::{CanonicalQuery, PreprocessorType, QueryPayload, SloQuery, TimeSeriesList, TimeSeriesQuery};

/// Dashboard time range of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, RequestError> {
        let range = Self { from, to };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<(), RequestError> {
        if self.to < self.from {
            return Err(RequestError::InvalidTimeRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    /// Length of the range in whole seconds
    pub fn duration_secs(&self) -> i64 {
        (self.to - self.from).num_seconds()
    }
}

/// Everything a request needs besides the query itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub time_range: TimeRange,
    /// Dashboard interval, used when the query carries none
    pub interval_ms: u64,
}

impl RequestContext {
    pub fn new(time_range: TimeRange, interval_ms: u64) -> Self {
        Self { time_range, interval_ms }
    }
}

/// A request against the Cloud Monitoring API
#[derive(Debug, Clone, PartialEq)]
pub enum CloudMonitoringRequest {
    /// `GET {project}/timeSeries` with query parameters
    TimeSeriesList {
        ref_id: String,
        alias_by: Option<String>,
        project_name: String,
        params: QueryParams,
    },
    /// `POST {project}/timeSeries:query` with an MQL body
    TimeSeriesQuery {
        ref_id: String,
        alias_by: Option<String>,
        project_name: String,
        query: String,
    },
    /// `GET {project}/timeSeries` selecting an SLO
    Slo {
        ref_id: String,
        alias_by: Option<String>,
        project_name: String,
        params: QueryParams,
    },
}

impl CloudMonitoringRequest {
    pub fn ref_id(&self) -> &str {
        match self {
            CloudMonitoringRequest::TimeSeriesList { ref_id, .. }
            | CloudMonitoringRequest::TimeSeriesQuery { ref_id, .. }
            | CloudMonitoringRequest::Slo { ref_id, .. } => ref_id,
        }
    }

    pub fn alias_by(&self) -> Option<&str> {
        match self {
            CloudMonitoringRequest::TimeSeriesList { alias_by, .. }
            | CloudMonitoringRequest::TimeSeriesQuery { alias_by, .. }
            | CloudMonitoringRequest::Slo { alias_by, .. } => alias_by.as_deref(),
        }
    }

    pub fn project_name(&self) -> &str {
        match self {
            CloudMonitoringRequest::TimeSeriesList { project_name, .. }
            | CloudMonitoringRequest::TimeSeriesQuery { project_name, .. }
            | CloudMonitoringRequest::Slo { project_name, .. } => project_name,
        }
    }

    /// Query parameters, `None` for MQL requests
    pub fn params(&self) -> Option<&QueryParams> {
        match self {
            CloudMonitoringRequest::TimeSeriesList { params, .. } | CloudMonitoringRequest::Slo { params, .. } => {
                Some(params)
            }
            CloudMonitoringRequest::TimeSeriesQuery { .. } => None,
        }
    }

    /// Path below the monitoring base URL, query string excluded
    pub fn path(&self) -> String {
        match self {
            CloudMonitoringRequest::TimeSeriesQuery { project_name, .. } => {
                format!("{project_name}/timeSeries:query")
            }
            _ => format!("{}/timeSeries", self.project_name()),
        }
    }

    /// Full URL below `base_url`, query string included
    pub fn url(&self, base_url: &str) -> String {
        match self.params() {
            Some(params) if !params.is_empty() => format!("{base_url}{}?{}", self.path(), params.encode()),
            _ => format!("{base_url}{}", self.path()),
        }
    }

    /// JSON body of MQL requests
    pub fn body(&self) -> Option<Value> {
        match self {
            CloudMonitoringRequest::TimeSeriesQuery { query, .. } => Some(json!({ "query": query })),
            _ => None,
        }
    }
}

/// Build the backend request for an interpolated canonical query
pub fn build_request(query: &CanonicalQuery, context: &RequestContext) -> Result<CloudMonitoringRequest, RequestError> {
    context.time_range.validate()?;
    let interval_ms = query.interval_ms.unwrap_or(context.interval_ms);
    let ref_id = query.ref_id.clone();
    let alias_by = query.alias_by.clone();

    let request = match &query.payload {
        QueryPayload::TimeSeriesList { time_series_list } => CloudMonitoringRequest::TimeSeriesList {
            ref_id,
            alias_by,
            project_name: time_series_list.project_name.clone().unwrap_or_default(),
            params: time_series_list_params(time_series_list, &context.time_range, interval_ms),
        },
        QueryPayload::Annotation { annotation } => CloudMonitoringRequest::TimeSeriesList {
            ref_id,
            alias_by,
            project_name: annotation.list.project_name.clone().unwrap_or_default(),
            params: time_series_list_params(&annotation.list, &context.time_range, interval_ms),
        },
        QueryPayload::TimeSeriesQuery { time_series_query } => CloudMonitoringRequest::TimeSeriesQuery {
            ref_id,
            alias_by,
            project_name: time_series_query.project_name.clone().unwrap_or_default(),
            query: mql_text(time_series_query, interval_ms),
        },
        QueryPayload::Slo { slo_query } => CloudMonitoringRequest::Slo {
            ref_id,
            alias_by,
            project_name: slo_query.project_name.clone().unwrap_or_default(),
            params: slo_params(slo_query, &context.time_range, interval_ms),
        },
    };

    tracing::debug!(ref_id = request.ref_id(), path = %request.path(), "built request");
    Ok(request)
}

fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn add_interval(params: &mut QueryParams, range: &TimeRange) {
    params.add("interval.startTime", rfc3339(&range.from));
    params.add("interval.endTime", rfc3339(&range.to));
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ============================================================================
// Time series list
// ============================================================================

/// Aggregation settings after defaults and preprocessing
struct Aggregation {
    alignment_period: String,
    cross_series_reducer: String,
    per_series_aligner: String,
    group_bys: Vec<String>,
    secondary_alignment_period: Option<String>,
    secondary_cross_series_reducer: Option<String>,
    secondary_per_series_aligner: Option<String>,
    secondary_group_bys: Vec<String>,
}

impl Aggregation {
    fn from_list(list: &TimeSeriesList) -> Self {
        let mut aggregation = Aggregation {
            alignment_period: list.alignment_period.clone().unwrap_or_default(),
            cross_series_reducer: non_empty(&list.cross_series_reducer).unwrap_or(DEFAULT_REDUCER).to_string(),
            per_series_aligner: non_empty(&list.per_series_aligner).unwrap_or(DEFAULT_ALIGNER).to_string(),
            group_bys: list.group_bys().to_vec(),
            secondary_alignment_period: non_empty(&list.secondary_alignment_period).map(str::to_string),
            secondary_cross_series_reducer: non_empty(&list.secondary_cross_series_reducer).map(str::to_string),
            secondary_per_series_aligner: non_empty(&list.secondary_per_series_aligner).map(str::to_string),
            secondary_group_bys: list.secondary_group_bys.clone().unwrap_or_default(),
        };
        aggregation.preprocess(list.preprocessor_type().unwrap_or_default());
        aggregation
    }

    /// A preprocessor becomes the primary aggregation and the selected
    /// aggregation moves to the secondary one
    fn preprocess(&mut self, preprocessor: PreprocessorType) {
        let aligner = match preprocessor {
            PreprocessorType::None => return,
            PreprocessorType::Rate => "ALIGN_RATE",
            PreprocessorType::Delta => "ALIGN_DELTA",
        };

        self.secondary_alignment_period = Some(self.alignment_period.clone());
        self.secondary_cross_series_reducer = Some(self.cross_series_reducer.clone());
        self.secondary_per_series_aligner = Some(self.per_series_aligner.clone());
        self.secondary_group_bys = self.group_bys.clone();

        if self.group_bys.is_empty() {
            self.cross_series_reducer = DEFAULT_REDUCER.to_string();
        }
        self.per_series_aligner = aligner.to_string();
    }
}

fn time_series_list_params(list: &TimeSeriesList, range: &TimeRange, interval_ms: u64) -> QueryParams {
    let range_secs = range.duration_secs();
    let aggregation = Aggregation::from_list(list);

    let mut params = QueryParams::new();
    add_interval(&mut params, range);
    params.add("filter", build_filter_string(list.filters()));
    params.add("view", non_empty(&list.view).unwrap_or(DEFAULT_VIEW));

    params.add(
        "aggregation.alignmentPeriod",
        calculate_alignment_period(&aggregation.alignment_period, interval_ms, range_secs),
    );
    params.add("aggregation.crossSeriesReducer", aggregation.cross_series_reducer);
    params.add("aggregation.perSeriesAligner", aggregation.per_series_aligner);
    for group_by in aggregation.group_bys {
        params.add("aggregation.groupByFields", group_by);
    }

    if let Some(period) = aggregation.secondary_alignment_period {
        params.add(
            "secondaryAggregation.alignmentPeriod",
            calculate_alignment_period(&period, interval_ms, range_secs),
        );
    }
    if let Some(reducer) = aggregation.secondary_cross_series_reducer {
        params.add("secondaryAggregation.crossSeriesReducer", reducer);
    }
    if let Some(aligner) = aggregation.secondary_per_series_aligner {
        params.add("secondaryAggregation.perSeriesAligner", aligner);
    }
    for group_by in aggregation.secondary_group_bys {
        params.add("secondaryAggregation.groupByFields", group_by);
    }

    params
}

// ============================================================================
// MQL and SLO
// ============================================================================

fn mql_text(query: &TimeSeriesQuery, interval_ms: u64) -> String {
    let mut text = query.query.clone().unwrap_or_default();
    if let Some(suffix) = graph_period_suffix(query.graph_period.as_deref(), interval_ms) {
        text.push_str(&suffix);
    }
    text
}

fn slo_params(slo: &SloQuery, range: &TimeRange, interval_ms: u64) -> QueryParams {
    let mut params = QueryParams::new();
    add_interval(&mut params, range);
    params.add("filter", build_slo_filter(slo));
    params.add(
        "aggregation.alignmentPeriod",
        calculate_alignment_period(
            slo.alignment_period.as_deref().unwrap_or_default(),
            interval_ms,
            range.duration_secs(),
        ),
    );

    let aligner = if slo.selector_name.as_deref() == Some(SLO_HEALTH_SELECTOR_NAME) {
        DEFAULT_ALIGNER
    } else {
        non_empty(&slo.per_series_aligner).unwrap_or(DEFAULT_ALIGNER)
    };
    params.add("aggregation.perSeriesAligner", aligner);

    params
}
