//! Error types for the catalog and backend HTTP clients

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the backend
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Jamendo answered 200 but flagged the request as failed in its headers
    #[error("Catalog error ({code}): {message}")]
    Catalog { code: i64, message: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::AuthRequired => Some(401),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
