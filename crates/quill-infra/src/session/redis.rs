//! Redis session store - shares sessions across server instances.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use quill_core::domain::{SessionToken, SessionUser};
use quill_core::ports::{SessionError, SessionStore};

/// Redis session configuration.
#[derive(Debug, Clone)]
pub struct RedisSessionConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
    /// Lifetime of a session; Redis expires the key.
    pub ttl: Duration,
    pub key_prefix: String,
}

impl RedisSessionConfig {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            ttl,
            key_prefix: "session".to_string(),
        }
    }
}

/// Redis-backed session store.
///
/// Each session is a JSON snapshot under `<prefix>:<token>` written with `SET EX`.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    config: RedisSessionConfig,
}

impl RedisSessionStore {
    pub async fn connect(config: RedisSessionConfig) -> Result<Self, SessionError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| SessionError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| SessionError::Connection("Connection timed out".to_string()))?
            .map_err(|e| SessionError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis session store");

        Ok(Self { conn, config })
    }

    fn key(&self, token: &SessionToken) -> String {
        format!("{}:{}", self.config.key_prefix, token.as_str())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user: SessionUser) -> Result<SessionToken, SessionError> {
        let token = SessionToken::generate();
        let value =
            serde_json::to_string(&user).map_err(|e| SessionError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.key(&token), value, self.config.ttl.as_secs().max(1))
            .await
            .map_err(|e| SessionError::Operation(e.to_string()))?;

        Ok(token)
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<SessionUser>, SessionError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.key(token))
            .await
            .map_err(|e| SessionError::Operation(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| SessionError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(token))
            .await
            .map_err(|e| SessionError::Operation(e.to_string()))
    }
}
