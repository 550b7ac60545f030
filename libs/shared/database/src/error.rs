use thiserror::Error;

/// Failures surfaced by a document store, whichever backend is behind it.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}
