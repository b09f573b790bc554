//! Interpolation and repair of canonical queries before execution

use serde_json::Value;

use crate::catalog::{resolve_aggregation, resolve_alignment, DEFAULT_ALIGNER, SLO_BURN_RATE_SELECTOR_NAME};
use crate::codec;
use crate::config::DataSourceSettings;
use crate::interpolate::{ScopedVars, TemplateInterpolator, TemplateVariables, VariableResolver};
use crate::migrator::{migrate, DEFAULT_VIEW};
use crate::model::{
    CanonicalQuery, MetricDescriptor, PersistedQuery, QueryPayload, SloQuery, TimeSeriesList, TimeSeriesQuery,
};
use crate::request::{build_request, CloudMonitoringRequest, RequestContext, RequestError};

/// Turns canonical queries into the payload sent to the backend
///
/// Owns the data-source settings (for the default project) and the
/// dashboard's variables. Queries passed in are never modified.
#[derive(Debug, Clone)]
pub struct QueryApplier<V: VariableResolver = TemplateVariables> {
    settings: DataSourceSettings,
    variables: V,
}

impl<V: VariableResolver> QueryApplier<V> {
    pub fn new(settings: DataSourceSettings, variables: V) -> Self {
        Self { settings, variables }
    }

    pub fn settings(&self) -> &DataSourceSettings {
        &self.settings
    }

    pub fn variables(&self) -> &V {
        &self.variables
    }

    fn interpolator(&self) -> TemplateInterpolator<'_, V> {
        TemplateInterpolator::new(&self.variables)
    }

    /// Interpolate every field of `query`
    pub fn apply(&self, query: &CanonicalQuery, scoped: &ScopedVars) -> CanonicalQuery {
        let interpolator = self.interpolator();
        let mut applied = query.clone();

        match &mut applied.payload {
            QueryPayload::TimeSeriesList { time_series_list } => {
                self.apply_list(time_series_list, &interpolator, scoped);
            }
            QueryPayload::Annotation { annotation } => {
                interpolate_field(&mut annotation.title, &interpolator, scoped);
                interpolate_field(&mut annotation.text, &interpolator, scoped);
                self.apply_list(&mut annotation.list, &interpolator, scoped);
            }
            QueryPayload::TimeSeriesQuery { time_series_query } => {
                self.apply_mql(time_series_query, &interpolator, scoped);
            }
            QueryPayload::Slo { slo_query } => apply_slo(slo_query, &interpolator, scoped),
        }

        applied
    }

    /// [`apply`](Self::apply), then make the aligner and reducer legal for
    /// the query's metric
    pub fn apply_with_descriptor(
        &self,
        query: &CanonicalQuery,
        scoped: &ScopedVars,
        descriptor: &MetricDescriptor,
    ) -> CanonicalQuery {
        let mut applied = self.apply(query, scoped);
        let (value_type, metric_kind) = (descriptor.value_type, descriptor.metric_kind);

        if let Some(list) = applied.time_series_list_mut() {
            let current = list.per_series_aligner.as_deref().unwrap_or(DEFAULT_ALIGNER);
            let resolution = resolve_alignment(value_type, metric_kind, current, list.preprocessor_type());
            list.per_series_aligner = Some(resolution.aligner);
            list.cross_series_reducer = list
                .cross_series_reducer
                .as_deref()
                .map(|current| resolve_aggregation(value_type, metric_kind, current));
        }

        applied
    }

    /// Whether `query` is complete enough to be sent
    pub fn should_run(&self, query: &CanonicalQuery) -> bool {
        if query.hide == Some(true) {
            return false;
        }
        match &query.payload {
            QueryPayload::Slo { slo_query } => slo_is_complete(slo_query),
            QueryPayload::TimeSeriesQuery { time_series_query } => {
                time_series_query.query.as_deref().is_some_and(|q| !q.is_empty())
            }
            QueryPayload::TimeSeriesList { time_series_list } => !codec::get_metric_type(time_series_list.filters()).is_empty(),
            QueryPayload::Annotation { annotation } => !codec::get_metric_type(annotation.list.filters()).is_empty(),
        }
    }

    /// Migrate and interpolate persisted queries, e.g. for exploring a panel
    pub fn interpolate_queries(
        &self,
        queries: impl IntoIterator<Item = PersistedQuery>,
        scoped: &ScopedVars,
    ) -> Vec<CanonicalQuery> {
        queries
            .into_iter()
            .map(|query| self.apply(&migrate(query), scoped))
            .collect()
    }

    /// Backend requests for every query that should run
    pub fn build_requests(
        &self,
        queries: &[CanonicalQuery],
        scoped: &ScopedVars,
        context: &RequestContext,
    ) -> Result<Vec<CloudMonitoringRequest>, RequestError> {
        let runnable: Vec<&CanonicalQuery> = queries.iter().filter(|query| self.should_run(query)).collect();
        if runnable.len() < queries.len() {
            tracing::debug!(skipped = queries.len() - runnable.len(), "skipping incomplete queries");
        }
        runnable
            .into_iter()
            .map(|query| build_request(&self.apply(query, scoped), context))
            .collect()
    }

    fn project_or_default<'q>(&'q self, project_name: &'q Option<String>) -> &'q str {
        project_name
            .as_deref()
            .filter(|project| !project.is_empty())
            .unwrap_or_else(|| self.settings.default_project())
    }

    fn apply_list(&self, list: &mut TimeSeriesList, interpolator: &TemplateInterpolator<'_, V>, scoped: &ScopedVars) {
        let project = interpolator.interpolate(self.project_or_default(&list.project_name), scoped);
        list.project_name = Some(project);

        for field in [
            &mut list.cross_series_reducer,
            &mut list.alignment_period,
            &mut list.per_series_aligner,
            &mut list.view,
            &mut list.secondary_alignment_period,
            &mut list.secondary_cross_series_reducer,
            &mut list.secondary_per_series_aligner,
        ] {
            interpolate_field(field, interpolator, scoped);
        }
        for value in list.extra.values_mut() {
            if let Value::String(text) = value {
                *text = interpolator.interpolate(text, scoped);
            }
        }

        list.filters = Some(interpolator.interpolate_filters(list.filters(), scoped));
        list.group_bys = Some(interpolator.interpolate_group_bys(list.group_bys(), scoped));
        if let Some(group_bys) = &list.secondary_group_bys {
            list.secondary_group_bys = Some(interpolator.interpolate_group_bys(group_bys, scoped));
        }

        if list.view.as_deref().map_or(true, str::is_empty) {
            list.view = Some(DEFAULT_VIEW.to_string());
        }
    }

    fn apply_mql(&self, query: &mut TimeSeriesQuery, interpolator: &TemplateInterpolator<'_, V>, scoped: &ScopedVars) {
        let project = interpolator.interpolate(self.project_or_default(&query.project_name), scoped);
        query.project_name = Some(project);
        interpolate_field(&mut query.query, interpolator, scoped);
        interpolate_field(&mut query.graph_period, interpolator, scoped);
    }
}

fn interpolate_field<V: VariableResolver + ?Sized>(
    field: &mut Option<String>,
    interpolator: &TemplateInterpolator<'_, V>,
    scoped: &ScopedVars,
) {
    if let Some(text) = field {
        *text = interpolator.interpolate(text, scoped);
    }
}

fn apply_slo<V: VariableResolver + ?Sized>(
    slo: &mut SloQuery,
    interpolator: &TemplateInterpolator<'_, V>,
    scoped: &ScopedVars,
) {
    for field in [
        &mut slo.project_name,
        &mut slo.alignment_period,
        &mut slo.per_series_aligner,
        &mut slo.selector_name,
        &mut slo.service_id,
        &mut slo.service_name,
        &mut slo.slo_id,
        &mut slo.slo_name,
        &mut slo.lookback_period,
    ] {
        interpolate_field(field, interpolator, scoped);
    }
}

fn slo_is_complete(slo: &SloQuery) -> bool {
    let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
    let burn_rate = slo.selector_name.as_deref() == Some(SLO_BURN_RATE_SELECTOR_NAME);

    present(&slo.selector_name)
        && present(&slo.service_id)
        && present(&slo.slo_id)
        && present(&slo.project_name)
        && (!burn_rate || present(&slo.lookback_period))
}
