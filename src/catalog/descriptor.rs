//! Metric descriptor helpers for the query editor

use std::collections::HashSet;

use super::tables::SYSTEM_LABELS;
use crate::model::{MetricDescriptor, OptionGroup, SelectableValue};

/// One descriptor per service, in first-seen order
pub fn extract_services(descriptors: &[MetricDescriptor]) -> Vec<&MetricDescriptor> {
    let mut seen = HashSet::new();
    descriptors
        .iter()
        .filter(|d| seen.insert(d.service.clone()))
        .collect()
}

/// Descriptors belonging to `service`
pub fn metric_types_by_service<'a>(descriptors: &'a [MetricDescriptor], service: &str) -> Vec<&'a MetricDescriptor> {
    descriptors.iter().filter(|d| d.service == service).collect()
}

/// Metric types offered for a service and the one that should be selected
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTypeSelection {
    pub metric_types: Vec<SelectableValue>,
    pub selected: String,
}

/// Keep the selected metric type if `service` offers it, otherwise select
/// the service's first metric type
///
/// `interpolated` is `selected` with template variables resolved; membership
/// is checked against it so a variable survives the check.
pub fn select_metric_type(
    descriptors: &[MetricDescriptor],
    selected: &str,
    interpolated: &str,
    service: &str,
) -> MetricTypeSelection {
    let metric_types: Vec<SelectableValue> = metric_types_by_service(descriptors, service)
        .into_iter()
        .map(|d| SelectableValue::new(d.display_name.clone(), d.metric_type.clone()))
        .collect();

    let selected = if metric_types.iter().any(|m| m.value == interpolated) {
        selected.to_string()
    } else {
        metric_types.first().map(|m| m.value.clone()).unwrap_or_default()
    };

    MetricTypeSelection { metric_types, selected }
}

/// Label keys of a metric followed by the system labels
pub fn label_keys<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .map(Into::into)
        .chain(SYSTEM_LABELS.iter().map(|s| s.to_string()))
        .collect()
}

/// Group label keys by their prefix for display
///
/// `metric.label.instance_name` lands in `Metric Label`, a two-part key such
/// as `resource.type` in `Resource Type`.
pub fn labels_to_grouped_options(keys: &[String]) -> Vec<OptionGroup> {
    let mut groups: Vec<OptionGroup> = Vec::new();

    for key in keys {
        let parts: Vec<String> = key.split('.').map(start_case).collect();
        let prefix = if parts.len() == 2 { &parts[..] } else { &parts[..parts.len().saturating_sub(1)] };
        let label = prefix.join(" ");
        let option = SelectableValue::new(key.clone(), key.clone());

        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.options.push(option),
            None => groups.push(OptionGroup {
                label,
                options: vec![option],
            }),
        }
    }

    groups
}

fn start_case(word: &str) -> String {
    word.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
