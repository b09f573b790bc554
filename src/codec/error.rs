//! Filter codec error types

use crate::model::ParseFilterTokenError;

/// Errors that can occur when decoding a flat filter chain
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// A group ended before its value
    #[error("Incomplete filter at position {position}: [{}]", .tokens.join(", "))]
    Incomplete { position: usize, tokens: Vec<String> },
    /// Operator or condition outside the supported set
    #[error("Invalid filter token at position {position}: {source}")]
    InvalidToken {
        position: usize,
        #[source]
        source: ParseFilterTokenError,
    },
}
