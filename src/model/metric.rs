//! Metric descriptor types
//!
//! The backend declares, for every metric type, the kind of values it carries
//! and how those values accumulate over time. Both enums serialize to the
//! backend's own spelling so descriptors can be deserialized straight from an
//! API response.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ValueType
// ============================================================================

/// Value type of a metric's data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    #[default]
    Unspecified,
    Bool,
    Int64,
    Double,
    String,
    /// Histogram-like value with buckets
    Distribution,
    Money,
}

impl ValueType {
    pub const ALL: [ValueType; 7] = [
        ValueType::Unspecified,
        ValueType::Bool,
        ValueType::Int64,
        ValueType::Double,
        ValueType::String,
        ValueType::Distribution,
        ValueType::Money,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Unspecified => "VALUE_TYPE_UNSPECIFIED",
            ValueType::Bool => "BOOL",
            ValueType::Int64 => "INT64",
            ValueType::Double => "DOUBLE",
            ValueType::String => "STRING",
            ValueType::Distribution => "DISTRIBUTION",
            ValueType::Money => "MONEY",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a value type or metric kind string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown {what} '{input}'")]
pub struct ParseMetricEnumError {
    pub what: &'static str,
    pub input: String,
}

impl FromStr for ValueType {
    type Err = ParseMetricEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .iter()
            .copied()
            .find(|vt| vt.as_str() == s)
            .ok_or_else(|| ParseMetricEnumError {
                what: "value type",
                input: s.to_string(),
            })
    }
}

// Unknown strings fall back to Unspecified: descriptors come from a remote
// API that may grow new values.
impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ValueType::from_str(&s).unwrap_or_default())
    }
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// MetricKind
// ============================================================================

/// How a metric's values relate to each other over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetricKind {
    #[default]
    Unspecified,
    /// Instantaneous measurement
    Gauge,
    /// Change since the previous point
    Delta,
    /// Running total since a start time
    Cumulative,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Unspecified,
        MetricKind::Gauge,
        MetricKind::Delta,
        MetricKind::Cumulative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Unspecified => "METRIC_KIND_UNSPECIFIED",
            MetricKind::Gauge => "GAUGE",
            MetricKind::Delta => "DELTA",
            MetricKind::Cumulative => "CUMULATIVE",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ParseMetricEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .iter()
            .copied()
            .find(|mk| mk.as_str() == s)
            .ok_or_else(|| ParseMetricEnumError {
                what: "metric kind",
                input: s.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(MetricKind::from_str(&s).unwrap_or_default())
    }
}

impl Serialize for MetricKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// PreprocessorType
// ============================================================================

/// Transform applied to cumulative and delta series before alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreprocessorType {
    #[default]
    None,
    Rate,
    Delta,
}

impl PreprocessorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessorType::None => "none",
            PreprocessorType::Rate => "rate",
            PreprocessorType::Delta => "delta",
        }
    }
}

impl fmt::Display for PreprocessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreprocessorType {
    type Err = ParseMetricEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(PreprocessorType::None),
            "rate" => Ok(PreprocessorType::Rate),
            "delta" => Ok(PreprocessorType::Delta),
            _ => Err(ParseMetricEnumError {
                what: "preprocessor",
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for PreprocessorType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PreprocessorType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for PreprocessorType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// MetricDescriptor
// ============================================================================

/// Backend-declared metadata for a metric type
///
/// `metric_type` is the primary key. `service` and `service_short_name` are
/// derived from it when descriptors are fetched (see
/// [`crate::discovery::LabelDiscoveryCache::metric_descriptors`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricDescriptor {
    #[serde(rename = "type")]
    pub metric_type: String,
    pub unit: String,
    pub service: String,
    pub service_short_name: String,
    pub display_name: String,
    pub description: String,
    pub value_type: ValueType,
    pub metric_kind: MetricKind,
}

impl MetricDescriptor {
    /// Fill in the fields derived from `metric_type`
    ///
    /// `compute.googleapis.com/instance/cpu/usage_time` has service
    /// `compute.googleapis.com` and short name `compute`.
    pub fn with_derived_fields(mut self) -> Self {
        let service = self.metric_type.split('/').next().unwrap_or_default().to_string();
        self.service_short_name = service.split('.').next().unwrap_or_default().to_string();
        self.service = service;
        if self.display_name.is_empty() {
            self.display_name = self.metric_type.clone();
        }
        self
    }
}
