//! Flat filter chain encoding
//!
//! A chain is stored as `key, operator, value, condition, key, ...` with no
//! condition after the last filter.

use super::error::FilterError;
use crate::model::{Filter, FilterCondition, FilterOperator};

/// Key of the filter that selects the metric
pub const METRIC_TYPE_KEY: &str = "metric.type";

const GROUP: usize = 4;

/// Decode a flat chain into filters
///
/// The last group has no condition of its own. It is given `AND` when it
/// follows another filter and left unset otherwise.
pub fn decode(flat: &[String]) -> Result<Vec<Filter>, FilterError> {
    let mut filters = Vec::with_capacity(flat.len() / GROUP + 1);

    for (i, group) in flat.chunks(GROUP).enumerate() {
        let position = i * GROUP;
        let [key, operator, value, rest @ ..] = group else {
            return Err(FilterError::Incomplete {
                position,
                tokens: group.to_vec(),
            });
        };

        let operator = operator
            .parse::<FilterOperator>()
            .map_err(|source| FilterError::InvalidToken {
                position: position + 1,
                source,
            })?;

        let condition = match rest.first() {
            Some(condition) => Some(condition.parse::<FilterCondition>().map_err(|source| {
                FilterError::InvalidToken {
                    position: position + 3,
                    source,
                }
            })?),
            None if i > 0 => Some(FilterCondition::And),
            None => None,
        };

        filters.push(Filter {
            key: key.clone(),
            operator,
            value: value.clone(),
            condition,
        });
    }

    Ok(filters)
}

/// Flatten filters into a chain, dropping the trailing condition
pub fn encode(filters: &[Filter]) -> Vec<String> {
    let mut flat = Vec::with_capacity(filters.len() * GROUP);
    for filter in filters {
        flat.push(filter.key.clone());
        flat.push(filter.operator.as_str().to_string());
        flat.push(filter.value.clone());
        // keeps the chain aligned when a mid-chain condition is missing
        flat.push(filter.condition.unwrap_or_default().as_str().to_string());
    }
    flat.pop();
    flat
}

/// Point the `metric.type` filter at `metric_type`, appending one if absent
pub fn set_metric_type_filter(filters: &[Filter], metric_type: &str) -> Vec<Filter> {
    let mut updated = filters.to_vec();

    if let Some(existing) = updated.iter_mut().find(|f| f.key == METRIC_TYPE_KEY) {
        existing.value = metric_type.to_string();
        return updated;
    }

    if let Some(last) = updated.last_mut() {
        last.condition.get_or_insert(FilterCondition::And);
    }
    updated.push(Filter::new(METRIC_TYPE_KEY, FilterOperator::Equal, metric_type));
    updated
}

/// Value of the `metric.type` filter, `""` when there is none
pub fn get_metric_type_filter(filters: &[Filter]) -> &str {
    filters
        .iter()
        .find(|f| f.key == METRIC_TYPE_KEY)
        .map(|f| f.value.as_str())
        .unwrap_or_default()
}

/// Value two positions after the first `metric.type` key of a flat chain
pub fn get_metric_type(flat: &[String]) -> &str {
    flat.iter()
        .position(|token| token == METRIC_TYPE_KEY)
        .and_then(|i| flat.get(i + 2))
        .map(String::as_str)
        .unwrap_or_default()
}

/// Set the metric type directly on a flat chain
///
/// Works on chains that do not decode.
pub fn set_metric_type(flat: &[String], metric_type: &str) -> Vec<String> {
    let mut updated = flat.to_vec();

    if let Some(i) = updated.iter().position(|token| token == METRIC_TYPE_KEY) {
        if let Some(value) = updated.get_mut(i + 2) {
            *value = metric_type.to_string();
            return updated;
        }
        updated.truncate(i);
        updated.extend([METRIC_TYPE_KEY.to_string(), "=".to_string(), metric_type.to_string()]);
        return updated;
    }

    if !updated.is_empty() {
        updated.push(FilterCondition::And.as_str().to_string());
    }
    updated.extend([METRIC_TYPE_KEY.to_string(), "=".to_string(), metric_type.to_string()]);
    updated
}

/// Fold a metric type into a flat chain
pub fn fold_metric_type(flat: &[String], metric_type: &str) -> Vec<String> {
    match decode(flat) {
        Ok(filters) => encode(&set_metric_type_filter(&filters, metric_type)),
        Err(e) => {
            tracing::debug!(error = %e, "filter chain does not decode, setting metric type in place");
            set_metric_type(flat, metric_type)
        }
    }
}
