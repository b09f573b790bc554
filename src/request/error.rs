//! Request building error types

use chrono::{DateTime, Utc};

/// Errors that can occur when building a backend request
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The time range ends before it starts
    #[error("Invalid time range: end '{to}' is before start '{from}'")]
    InvalidTimeRange { from: DateTime<Utc>, to: DateTime<Utc> },
}
