use std::sync::Arc;

use crate::domain::{Credentials, NewUser, Session, SessionToken, SessionUser, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, SessionStore, UserRepository};

/// Signup, signin and signout.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    sessions: Arc<dyn SessionStore>,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            users,
            passwords,
            sessions,
        }
    }

    /// Register a new user. Names are unique.
    pub async fn register(&self, credentials: &Credentials) -> Result<User, DomainError> {
        credentials.validate()?;

        if self.users.find_by_name(&credentials.name).await?.is_some() {
            return Err(duplicate_name(&credentials.name));
        }

        let password_hash = self.passwords.hash(&credentials.password)?;
        let new_user = NewUser {
            name: credentials.name.clone(),
            password_hash,
        };

        // The unique index still guards against a concurrent signup with the same name.
        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            Err(RepoError::Constraint(_)) => return Err(duplicate_name(&credentials.name)),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.user_id, name = %user.name, "User registered");
        Ok(user)
    }

    /// Verify a name/password pair and open a session for the user.
    ///
    /// `previous` is the session the client presented, if any. It is left
    /// alone when verification fails and destroyed when it succeeds.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        previous: Option<&SessionToken>,
    ) -> Result<Session, DomainError> {
        let Some(user) = self.users.find_by_name(&credentials.name).await? else {
            tracing::debug!(name = %credentials.name, "Signin for unknown user");
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify(&credentials.password, &user.password_hash)?
        {
            tracing::debug!(user_id = user.user_id, "Signin with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        if let Some(old) = previous {
            self.sessions.destroy(old).await?;
        }

        let snapshot = SessionUser::from(&user);
        let token = self.sessions.create(snapshot.clone()).await?;
        tracing::info!(user_id = user.user_id, "User signed in");

        Ok(Session {
            token,
            user: snapshot,
        })
    }

    /// Resolve a token to its session user.
    pub async fn current_user(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionUser>, DomainError> {
        Ok(self.sessions.get(token).await?)
    }

    /// Destroy a session. Unknown tokens are not an error.
    pub async fn sign_out(&self, token: &SessionToken) -> Result<(), DomainError> {
        self.sessions.destroy(token).await?;
        tracing::debug!(?token, "Session destroyed");
        Ok(())
    }
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::Duplicate(format!("user name '{name}' is already taken"))
}
