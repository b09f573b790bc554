//! Destination-aware interpolation of query fields

use super::replace::{replace, VariableFormat};
use super::variables::{Layered, ScopedVars, VariableResolver, VariableValue};
use crate::codec;
use crate::model::{Filter, FilterOperator};

/// Interpolates template variables into query fields
///
/// Scoped variables passed to each call take precedence over the resolver
/// the interpolator was built with. Inputs are never modified.
pub struct TemplateInterpolator<'a, R: VariableResolver + ?Sized> {
    variables: &'a R,
}

impl<'a, R: VariableResolver + ?Sized> TemplateInterpolator<'a, R> {
    pub fn new(variables: &'a R) -> Self {
        Self { variables }
    }

    /// Interpolate a scalar field
    pub fn interpolate(&self, text: &str, scoped: &ScopedVars) -> String {
        self.replace(text, scoped, VariableFormat::Default)
    }

    /// Interpolate with an explicit format
    pub fn replace(&self, text: &str, scoped: &ScopedVars, format: VariableFormat<'_>) -> String {
        replace(text, &Layered::new(scoped, self.variables), format)
    }

    /// Interpolate an optional scalar field
    pub fn interpolate_opt(&self, text: Option<&str>, scoped: &ScopedVars) -> Option<String> {
        text.map(|t| self.interpolate(t, scoped))
    }

    /// Interpolate a flat filter chain
    ///
    /// Keys are scalar. Values compared with `=~` or `!~` turn a multi-valued
    /// variable into an alternation `(a|b)` and are never escaped; other
    /// values are scalar. Chains that do not decode are interpolated token
    /// group by token group.
    pub fn interpolate_filters(&self, filters: &[String], scoped: &ScopedVars) -> Vec<String> {
        match codec::decode(filters) {
            Ok(decoded) => {
                let interpolated: Vec<Filter> = decoded
                    .into_iter()
                    .map(|filter| Filter {
                        key: self.interpolate(&filter.key, scoped),
                        value: self.interpolate_filter_value(&filter.value, filter.operator.is_regex(), scoped),
                        ..filter
                    })
                    .collect();
                codec::encode(&interpolated)
            }
            Err(e) => {
                tracing::debug!(error = %e, "interpolating malformed filter chain token by token");
                filters
                    .chunks(4)
                    .flat_map(|group| {
                        let regex = group
                            .get(1)
                            .and_then(|op| op.parse::<FilterOperator>().ok())
                            .is_some_and(|op| op.is_regex());
                        group.iter().enumerate().map(move |(i, token)| match i {
                            0 => self.interpolate(token, scoped),
                            2 => self.interpolate_filter_value(token, regex, scoped),
                            _ => token.clone(),
                        })
                    })
                    .collect()
            }
        }
    }

    fn interpolate_filter_value(&self, value: &str, regex: bool, scoped: &ScopedVars) -> String {
        if !regex {
            return self.interpolate(value, scoped);
        }
        let alternation = |value: &VariableValue| match value {
            VariableValue::Single(v) => v.clone(),
            VariableValue::Multi(vs) if vs.is_empty() => String::new(),
            VariableValue::Multi(vs) => format!("({})", vs.join("|")),
        };
        self.replace(value, scoped, VariableFormat::Custom(&alternation))
    }

    /// Interpolate group-by fields, expanding multi-valued variables into
    /// one entry per value
    pub fn interpolate_group_bys(&self, group_bys: &[String], scoped: &ScopedVars) -> Vec<String> {
        group_bys
            .iter()
            .flat_map(|group_by| {
                self.replace(group_by, scoped, VariableFormat::Csv)
                    .split(',')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
