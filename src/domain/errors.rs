//! Domain errors for the issue relay.

use thiserror::Error;

/// Domain-level errors that can occur while reconciling issues.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Link not found: {0}")]
    LinkNotFound(i64),

    /// A write would break one of the link uniqueness constraints.
    #[error("Duplicate link: {0}")]
    DuplicateLink(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DomainError::DuplicateLink(db_err.message().to_string());
            }
        }
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Errors returned by the outbound tracker APIs.
///
/// These never abort a webhook request; the reconciler logs them and
/// leaves the link store untouched.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker answered with a status the caller does not accept.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The tracker answered with a success status but an unusable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TrackerError {
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        TrackerError::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status of the failed call, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
