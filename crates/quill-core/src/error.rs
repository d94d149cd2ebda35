//! Domain-level error types.

use thiserror::Error;

use crate::ports::{AuthError, SessionError};

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{entity_type} {id} is owned by another user")]
    NotOwner { entity_type: &'static str, id: i32 },

    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),

    #[error("Session store failure: {0}")]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for failures of a storage collaborator rather than of the request itself.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Session(_))
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::HashingError(msg) => Self::Internal(msg),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
