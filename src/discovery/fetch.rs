//! Remote resource fetching

use async_trait::async_trait;
use serde_json::Value;

/// Performs a GET against the backend and returns the decoded JSON body
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Errors returned by a [`ResourceFetcher`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The backend answered with a non-success status
    #[error("Request failed with status {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        /// `message` field of the response body
        message: Option<String>,
        /// `error` field of the response body
        error: Option<String>,
    },
    /// The request did not complete
    #[error("Request failed: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        FetchError::Http {
            status,
            status_text: status_text.into(),
            message: None,
            error: None,
        }
    }
}

/// Render a fetch error for display to the user
///
/// Starts from the status text. An `error` body is appended, as
/// `code. message` when it is a JSON error envelope and verbatim otherwise.
/// Without one, a `message` body holding a JSON error envelope replaces the
/// status text with the envelope's message.
pub fn format_fetch_error(error: &FetchError) -> String {
    let FetchError::Http {
        status_text,
        message,
        error: body_error,
        ..
    } = error
    else {
        return error.to_string();
    };

    let mut formatted = status_text.clone();
    if let Some(body_error) = body_error {
        match envelope(body_error) {
            Some((code, message)) => formatted.push_str(&format!("{}. {}", code, message)),
            None => formatted.push_str(body_error),
        }
    } else if let Some(message) = message {
        if let Some((_, message)) = envelope(message) {
            formatted = message;
        }
    }
    formatted
}

/// `{"error": {"code": .., "message": ..}}`
fn envelope(body: &str) -> Option<(String, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let code = match error.get("code")? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let message = error.get("message")?.as_str()?.to_string();
    Some((code, message))
}
