//! Error types for the relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Generator request timed out")]
    Timeout,

    #[error("Generator error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No response from generator")]
    NoCandidates,

    #[error("Blocked by safety filter")]
    Blocked,

    #[error("Invalid response structure")]
    InvalidStructure,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Missing query")]
    MissingQuery,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generator API key not configured")]
    MissingApiKey,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Http(e)
        }
    }
}

impl RelayError {
    /// Status code an HTTP front end should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            RelayError::Timeout => 504,
            RelayError::Blocked | RelayError::MissingQuery | RelayError::InvalidRequest(_) => 400,
            _ => 500,
        }
    }
}
