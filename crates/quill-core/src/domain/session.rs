use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserId};

/// Opaque handle for a server-side session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// Tokens are bearer secrets; only a prefix ever reaches the logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

/// The user snapshot bound to a session at signin time.
///
/// It is not refreshed from storage for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: UserId,
    pub name: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name.clone(),
        }
    }
}

/// A live session: the token handed to the client and the user it is bound to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: SessionUser,
}
