use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Storage-assigned user identifier.
pub type UserId = i32;

/// User entity - a registered author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    /// Login handle, also shown as the author of posts.
    pub name: String,
    /// Argon2 PHC string; never the raw password.
    pub password_hash: String,
}

/// A user row that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
}

/// Name and password as submitted on the signup and signin forms.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Reject a blank handle or an empty password before touching storage.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(DomainError::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

// Keep the password out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}
