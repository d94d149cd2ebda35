//! In-memory session store - the default when Redis is not configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{SessionToken, SessionUser};
use quill_core::ports::{SessionError, SessionStore};

struct SessionEntry {
    user: SessionUser,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local session table behind an async RwLock.
///
/// Sessions are lost on restart and are not shared between instances.
pub struct InMemorySessionStore {
    table: RwLock<HashMap<SessionToken, SessionEntry>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of entries held, expired ones included.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user: SessionUser) -> Result<SessionToken, SessionError> {
        let expires_at = Instant::now()
            .checked_add(self.ttl)
            .ok_or_else(|| SessionError::Operation("session TTL out of range".to_string()))?;

        let token = SessionToken::generate();
        let entry = SessionEntry { user, expires_at };

        self.table.write().await.insert(token.clone(), entry);
        Ok(token)
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<SessionUser>, SessionError> {
        let table = self.table.read().await;
        let Some(entry) = table.get(token) else {
            return Ok(None);
        };

        if entry.is_expired(Instant::now()) {
            drop(table);
            self.table.write().await.remove(token);
            return Ok(None);
        }

        Ok(Some(entry.user.clone()))
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.table.write().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        let mut table = self.table.write().await;
        let before = table.len();
        table.retain(|_, entry| !entry.is_expired(now));
        Ok(before - table.len())
    }
}
