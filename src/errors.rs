use thiserror::Error;
use uuid::Uuid;
use warp::reject;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an identifier that cannot be parsed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Represents a stored document whose body is not a flat object of
    /// strings.
    #[error("stored document {id} is corrupt")]
    CorruptDocument {
        id: Uuid,
        source: serde_json::Error,
    },

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },
}

impl reject::Reject for BackendError {}

/// Parses the textual form of a record identifier.
pub fn parse_id(id: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(id).map_err(|_| BackendError::InvalidIdentifier(id.to_owned()))
}
