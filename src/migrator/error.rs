//! Migration error types

/// Errors that can occur when reading a persisted query
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The persisted query is not a JSON object
    #[error("Persisted query must be an object, found {found}")]
    NotAnObject { found: &'static str },
    /// A known field has the wrong type
    #[error("Invalid persisted query: {source}")]
    InvalidField {
        #[from]
        source: serde_json::Error,
    },
}
