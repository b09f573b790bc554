use serde::{Deserialize, Serialize};

/// An option offered to a select field (projects, SLO services, SLOs)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectableValue {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target compliance of an SLO
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
}

impl SelectableValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            goal: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A labelled group of options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: String,
    pub options: Vec<SelectableValue>,
}
