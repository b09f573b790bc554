//! Query and settings parser (verb module)
//!
//! Persisted queries are read from dashboard JSON; settings from a
//! provisioning YAML file or a data source's `jsonData`.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::config::DataSourceSettings;
use crate::error::ParseError;
use crate::model::PersistedQuery;

fn read_file<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
    let path_str = path.as_ref().display().to_string();
    std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })
}

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, ParseError> {
    serde_json::from_str(json).map_err(ParseError::from)
}

/// Parse one persisted query from a JSON string
pub fn parse_query_str(json: &str) -> Result<PersistedQuery, ParseError> {
    parse_json(json)
}

/// Parse one persisted query from a JSON file
pub fn parse_query_file<P: AsRef<Path>>(path: P) -> Result<PersistedQuery, ParseError> {
    parse_query_str(&read_file(path)?)
}

/// Parse a panel's queries from a JSON array
pub fn parse_queries_str(json: &str) -> Result<Vec<PersistedQuery>, ParseError> {
    parse_json(json)
}

/// Parse a panel's queries from a JSON file holding an array
pub fn parse_queries_file<P: AsRef<Path>>(path: P) -> Result<Vec<PersistedQuery>, ParseError> {
    parse_queries_str(&read_file(path)?)
}

/// Parse data-source settings from YAML (JSON is accepted as well)
pub fn parse_settings_str(yaml: &str) -> Result<DataSourceSettings, ParseError> {
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}

/// Parse data-source settings from a YAML or JSON file
pub fn parse_settings_file<P: AsRef<Path>>(path: P) -> Result<DataSourceSettings, ParseError> {
    parse_settings_str(&read_file(path)?)
}
