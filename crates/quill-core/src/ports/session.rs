//! Session store port.

use async_trait::async_trait;

use crate::domain::{SessionToken, SessionUser};

/// Server-side session table - abstraction over session backends (Redis, in-memory).
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Bind `user` to a freshly generated token.
    async fn create(&self, user: SessionUser) -> Result<SessionToken, SessionError>;

    /// Look up a live session. Expired or destroyed tokens yield `None`.
    async fn get(&self, token: &SessionToken) -> Result<Option<SessionUser>, SessionError>;

    /// Remove a session. Destroying an unknown token succeeds.
    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionError>;

    /// Drop expired entries, returning how many were removed.
    ///
    /// Backends with native expiry have nothing to do here.
    async fn purge_expired(&self) -> Result<usize, SessionError> {
        Ok(0)
    }
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
