use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Session already exists: {details}")]
    SessionConflict { details: String },

    #[error("Authentication failed: {details}")]
    Authentication { details: String },

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Server error (Status: {status_code}): {details}")]
    ServerError { status_code: u16, details: String },

    #[error("Failed to parse response: {details}")]
    ResponseParsing { details: String },

    #[error("Stream error: {details}")]
    Stream { details: String },

    #[error("Unknown API error: {details}")]
    Unknown { details: String },
}

impl ApiError {
    pub fn is_session_conflict(&self) -> bool {
        matches!(self, Self::SessionConflict { .. })
    }
}
