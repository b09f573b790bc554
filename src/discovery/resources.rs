//! Typed lookups of metric descriptors, projects, services and SLOs

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::cache::{GetOptions, LabelDiscoveryCache, RESOURCE_MANAGER_BASE_URL};
use crate::model::{MetricDescriptor, SelectableValue};

/// Last segment of a resource name such as `projects/p/services/s`
fn last_segment(name: &str) -> &str {
    name.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn typed<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed resource");
                None
            }
        })
        .collect()
}

/// Add `service`, `serviceShortName` and a default `displayName`
fn derive_descriptor_fields(descriptor: &Value) -> Value {
    let mut descriptor = descriptor.clone();
    let metric_type = str_field(&descriptor, "type").to_string();
    let service = metric_type.split('/').next().unwrap_or_default().to_string();
    let short_name = service.split('.').next().unwrap_or_default().to_string();

    if let Some(fields) = descriptor.as_object_mut() {
        fields.insert("service".into(), Value::String(service));
        fields.insert("serviceShortName".into(), Value::String(short_name));
        let has_display_name = fields
            .get("displayName")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        if !has_display_name {
            fields.insert("displayName".into(), Value::String(metric_type));
        }
    }
    descriptor
}

impl LabelDiscoveryCache {
    /// Metric descriptors of a project
    pub async fn metric_descriptors(&self, project: &str) -> Vec<MetricDescriptor> {
        if project.is_empty() {
            return Vec::new();
        }
        let path = format!("{}/metricDescriptors", project);
        let values = self
            .get(&path, GetOptions::default().with_map(derive_descriptor_fields))
            .await;
        typed(values)
    }

    /// Projects visible to the data source's credentials
    pub async fn projects(&self) -> Vec<SelectableValue> {
        let options = GetOptions::default()
            .with_base_url(RESOURCE_MANAGER_BASE_URL)
            .with_map(|project| {
                json!({
                    "value": str_field(project, "projectId"),
                    "label": str_field(project, "name"),
                })
            });
        typed(self.get("projects", options).await)
    }

    /// Services with SLOs in a project
    pub async fn slo_services(&self, project: &str) -> Vec<SelectableValue> {
        if project.is_empty() {
            return Vec::new();
        }
        let path = format!("{}/services?pageSize=1000", project);
        let options = GetOptions::default().with_map(|service| {
            let id = last_segment(str_field(service, "name"));
            let label = match str_field(service, "displayName") {
                "" => id,
                name => name,
            };
            json!({ "value": id, "label": label })
        });
        typed(self.get(&path, options).await)
    }

    /// SLOs of a service
    pub async fn service_level_objectives(&self, project: &str, service_id: &str) -> Vec<SelectableValue> {
        if project.is_empty() || service_id.is_empty() {
            return Vec::new();
        }
        let path = format!("{}/services/{}/serviceLevelObjectives", project, service_id);
        let options = GetOptions::default().with_map(|slo| {
            let mut option = json!({
                "value": last_segment(str_field(slo, "name")),
                "label": str_field(slo, "displayName"),
            });
            if let Some(goal) = slo.get("goal").filter(|goal| goal.is_number()) {
                option["goal"] = goal.clone();
            }
            option
        });
        typed(self.get(&path, options).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_descriptor_fields() {
        let derived = derive_descriptor_fields(&json!({
            "type": "loadbalancing.googleapis.com/https/request_count",
            "metricKind": "DELTA"
        }));
        assert_eq!(derived["service"], "loadbalancing.googleapis.com");
        assert_eq!(derived["serviceShortName"], "loadbalancing");
        assert_eq!(derived["displayName"], "loadbalancing.googleapis.com/https/request_count");

        let named = derive_descriptor_fields(&json!({"type": "a.b/c", "displayName": "Requests"}));
        assert_eq!(named["displayName"], "Requests");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("projects/123/services/my-service"), "my-service");
        assert_eq!(last_segment("projects/123/services/my-service/"), "my-service");
        assert_eq!(last_segment(""), "");
    }
}
