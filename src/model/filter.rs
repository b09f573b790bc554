//! Filter types
//!
//! Persisted queries keep filters as a flat list of strings
//! (`key, operator, value, condition, key, ...`). These types are the
//! structured form produced by [`crate::codec::decode`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    RegexMatch,
    /// `!~`
    RegexNotMatch,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::RegexMatch => "=~",
            FilterOperator::RegexNotMatch => "!~",
        }
    }

    /// Whether the value is matched as a regular expression
    pub fn is_regex(&self) -> bool {
        matches!(self, FilterOperator::RegexMatch | FilterOperator::RegexNotMatch)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an operator or condition string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown filter {what} '{input}'")]
pub struct ParseFilterTokenError {
    pub what: &'static str,
    pub input: String,
}

impl FromStr for FilterOperator {
    type Err = ParseFilterTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(FilterOperator::Equal),
            "!=" => Ok(FilterOperator::NotEqual),
            "=~" => Ok(FilterOperator::RegexMatch),
            "!~" => Ok(FilterOperator::RegexNotMatch),
            _ => Err(ParseFilterTokenError {
                what: "operator",
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FilterOperator::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FilterOperator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Connective between two filters. Only `AND` is supported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterCondition {
    #[default]
    And,
}

impl FilterCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCondition::And => "AND",
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCondition {
    type Err = ParseFilterTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(FilterCondition::And),
            _ => Err(ParseFilterTokenError {
                what: "condition",
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for FilterCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FilterCondition::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FilterCondition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single `key operator value` comparison, optionally chained to the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub operator: FilterOperator,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FilterCondition>,
}

impl Filter {
    /// Create an unchained filter
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: value.into(),
            condition: None,
        }
    }

    /// Chain this filter to the next one with `AND`
    pub fn and(mut self) -> Self {
        self.condition = Some(FilterCondition::And);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!("=".parse::<FilterOperator>().unwrap(), FilterOperator::Equal);
        assert_eq!("!=".parse::<FilterOperator>().unwrap(), FilterOperator::NotEqual);
        assert_eq!("=~".parse::<FilterOperator>().unwrap(), FilterOperator::RegexMatch);
        assert_eq!("!~".parse::<FilterOperator>().unwrap(), FilterOperator::RegexNotMatch);
        assert!("==".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_regex_operators() {
        assert!(FilterOperator::RegexMatch.is_regex());
        assert!(FilterOperator::RegexNotMatch.is_regex());
        assert!(!FilterOperator::Equal.is_regex());
        assert!(!FilterOperator::NotEqual.is_regex());
    }

    #[test]
    fn test_only_and_condition() {
        assert_eq!("AND".parse::<FilterCondition>().unwrap(), FilterCondition::And);
        assert!("OR".parse::<FilterCondition>().is_err());
        assert!("and".parse::<FilterCondition>().is_err());
    }

    #[test]
    fn test_filter_serde() {
        let filter = Filter::new("zone", FilterOperator::RegexMatch, "us-.*").and();
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"key":"zone","operator":"=~","value":"us-.*","condition":"AND"}"#);

        let last: Filter = serde_json::from_str(r#"{"key":"a","operator":"!=","value":"b"}"#).unwrap();
        assert_eq!(last, Filter::new("a", FilterOperator::NotEqual, "b"));
    }
}
