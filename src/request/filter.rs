//! Monitoring filter language
//!
//! Renders a flat filter chain into the expression syntax of the
//! `timeSeries.list` `filter` parameter.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::catalog::SLO_BURN_RATE_SELECTOR_NAME;
use crate::model::SloQuery;

/// Characters escaped when a wildcard value becomes a full-match regex
static WILDCARD_ESCAPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-/^$+?.()|\[\]{}]").expect("wildcard escape pattern is a valid regex"));

/// Render a flat filter chain as a filter expression
///
/// Keys and operators are written as-is and values quoted. Regex operators
/// wrap their value in `monitoring.regex.full_match`; a `*` in a plain value
/// is translated by [`interpolate_filter_wildcards`].
pub fn build_filter_string(filters: &[String]) -> String {
    let mut out = String::new();
    for (i, part) in filters.iter().enumerate() {
        match i % 4 {
            1 => match part.as_str() {
                "=~" => out.push('='),
                "!~" => out.push_str("!="),
                op => out.push_str(op),
            },
            2 => {
                let regex = matches!(filters.get(i - 1).map(String::as_str), Some("=~" | "!~"));
                if regex {
                    out.push_str(&format!("monitoring.regex.full_match(\"{part}\")"));
                } else if part.contains('*') {
                    out.push_str(&interpolate_filter_wildcards(part));
                } else {
                    out.push_str(&format!("\"{part}\""));
                }
            }
            // the only connective is AND, written as whitespace
            3 => out.push(' '),
            _ => out.push_str(part),
        }
    }
    out.trim().to_string()
}

/// Translate `*` wildcards in a filter value into filter functions
///
/// `*x*` becomes `has_substring`, `*x` `ends_with`, `x*` `starts_with`;
/// anything else with a wildcard becomes an anchored full-match regex.
/// Values without a wildcard are returned unchanged.
pub fn interpolate_filter_wildcards(value: &str) -> String {
    let matches = value.matches('*').count();
    let prefix = value.starts_with('*');
    let suffix = value.ends_with('*');

    match matches {
        0 => value.to_string(),
        2 if prefix && suffix => {
            format!("has_substring(\"{}\")", value.replace('*', ""))
        }
        1 if prefix => format!("ends_with(\"{}\")", &value[1..]),
        1 if suffix => format!("starts_with(\"{}\")", &value[..value.len() - 1]),
        _ => {
            let escaped = WILDCARD_ESCAPE_REGEX.replace_all(value, |caps: &Captures| format!(r"\\{}", &caps[0]));
            let pattern = escaped.replace('*', ".*").replace('"', r#"\\""#);
            format!("monitoring.regex.full_match(\"^{pattern}$\")")
        }
    }
}

/// Filter selecting one service level objective's time series
///
/// `select_slo_burn_rate` takes the lookback period as a second argument.
pub fn build_slo_filter(slo: &SloQuery) -> String {
    let selector = slo.selector_name.as_deref().unwrap_or_default();
    let name = format!(
        "projects/{}/services/{}/serviceLevelObjectives/{}",
        slo.project_name.as_deref().unwrap_or_default(),
        slo.service_id.as_deref().unwrap_or_default(),
        slo.slo_id.as_deref().unwrap_or_default(),
    );

    if selector == SLO_BURN_RATE_SELECTOR_NAME {
        let lookback = slo.lookback_period.as_deref().unwrap_or_default();
        format!("{selector}(\"{name}\", \"{lookback}\")")
    } else {
        format!("{selector}(\"{name}\")")
    }
}
