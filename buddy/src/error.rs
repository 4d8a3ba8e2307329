use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuddyError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The collaborator answered, but the body did not match the expected schema.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BuddyError {
    /// Whether a GET may be attempted again after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            BuddyError::Http(e) => e.status().map(|s| s.is_server_error()).unwrap_or(true),
            BuddyError::Api { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuddyError>;
