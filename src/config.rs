//! Data-source settings
//!
//! Read from the data source's `jsonData`, or from a settings file through
//! [`crate::parser`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the data source authenticates against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationType {
    /// Service account key file
    #[default]
    Jwt,
    /// Google Compute Engine default service account
    Gce,
}

impl AuthenticationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationType::Jwt => "jwt",
            AuthenticationType::Gce => "gce",
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of one Cloud Monitoring data source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSourceSettings {
    pub authentication_type: AuthenticationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,
    /// Project of the compute instance, discovered at runtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gce_default_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

impl DataSourceSettings {
    /// Settings with a default project and key file authentication
    pub fn with_default_project(project: impl Into<String>) -> Self {
        Self {
            default_project: Some(project.into()),
            ..Default::default()
        }
    }

    /// Read settings from a data source's `jsonData`
    pub fn from_json_data(json_data: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json_data)
    }

    /// Project queries fall back to when they name none
    pub fn default_project(&self) -> &str {
        let project = match self.authentication_type {
            AuthenticationType::Gce => self.gce_default_project.as_deref(),
            AuthenticationType::Jwt => self.default_project.as_deref(),
        };
        project.unwrap_or_default()
    }
}
