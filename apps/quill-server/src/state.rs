//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AuthError, PasswordService, PostRepository, RateLimiter, SessionError, SessionStore,
    UserRepository,
};
use quill_core::{CredentialService, PostService};
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemorySessionStore, InMemoryUserRepository,
};

use crate::config::{AppConfig, ConfigError};
use crate::session::SessionCookies;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database unavailable: {0}")]
    Database(String),

    #[error("Session store unavailable: {0}")]
    Session(#[from] SessionError),

    #[error("Password hasher misconfigured: {0}")]
    Password(#[from] AuthError),

    #[error("Rate limiter misconfigured: {0}")]
    RateLimit(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    pub posts: PostService,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: SessionCookies,
    /// Throttles credential submissions. `None` disables throttling.
    pub limiter: Option<Arc<dyn RateLimiter>>,
    /// Throttle on forwarded client addresses rather than the socket peer.
    pub trust_proxy_headers: bool,
    /// Storage backend name reported by the health probe.
    pub storage: &'static str,
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>, &'static str);

impl AppState {
    /// Build the application state from configuration.
    ///
    /// A configured database that cannot be reached fails startup rather
    /// than silently falling back to volatile storage.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let (users, posts, storage) = repositories(config).await?;
        let sessions = session_store(config).await?;

        let mut state = Self::assemble(config, users, posts, sessions, storage)?;
        if let Some(limiter) = rate_limiter(config)? {
            state = state.with_limiter(limiter);
        }

        tracing::info!(
            storage,
            throttled = state.limiter.is_some(),
            "Application state initialized"
        );
        Ok(state)
    }

    /// State backed entirely by in-memory adapters.
    pub fn in_memory(config: &AppConfig) -> Result<Self, StartupError> {
        Self::assemble(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemorySessionStore::new(config.session.ttl)),
            "memory",
        )
    }

    /// Enable credential throttling.
    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub(crate) fn assemble(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        sessions: Arc<dyn SessionStore>,
        storage: &'static str,
    ) -> Result<Self, StartupError> {
        let passwords: Arc<dyn PasswordService> =
            Arc::new(Argon2PasswordService::new(&config.password)?);

        Ok(Self {
            credentials: CredentialService::new(users, passwords, sessions.clone()),
            posts: PostService::new(posts),
            sessions,
            cookies: SessionCookies::new(&config.session)?,
            limiter: None,
            trust_proxy_headers: config.rate_limit.trust_proxy_headers,
            storage,
        })
    }
}

#[cfg(feature = "postgres")]
async fn repositories(config: &AppConfig) -> Result<Repositories, StartupError> {
    use migration::MigratorTrait;
    use quill_infra::database::{DatabaseConfig, connect};
    use quill_infra::{PostgresPostRepository, PostgresUserRepository};

    let Some(settings) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Ok(in_memory_repositories());
    };

    let conn = connect(&DatabaseConfig {
        url: settings.url.clone(),
        max_connections: settings.max_connections,
        min_connections: settings.min_connections,
    })
    .await
    .map_err(|e| StartupError::Database(e.to_string()))?;

    if settings.auto_migrate {
        migration::Migrator::up(&conn, None)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;
        tracing::info!("Database migrations applied");
    }

    Ok((
        Arc::new(PostgresUserRepository::new(conn.clone())),
        Arc::new(PostgresPostRepository::new(conn)),
        "postgres",
    ))
}

#[cfg(not(feature = "postgres"))]
async fn repositories(config: &AppConfig) -> Result<Repositories, StartupError> {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
    }
    Ok(in_memory_repositories())
}

fn in_memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryPostRepository::new()),
        "memory",
    )
}

#[cfg(feature = "redis")]
async fn session_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>, StartupError> {
    use quill_infra::{RedisSessionConfig, RedisSessionStore};

    match &config.redis_url {
        Some(url) => {
            let store =
                RedisSessionStore::connect(RedisSessionConfig::new(url, config.session.ttl))
                    .await?;
            tracing::info!("Using Redis session store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemorySessionStore::new(config.session.ttl))),
    }
}

#[cfg(not(feature = "redis"))]
async fn session_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>, StartupError> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL ignored: built without the redis feature");
    }
    Ok(Arc::new(InMemorySessionStore::new(config.session.ttl)))
}

#[cfg(feature = "rate-limit")]
fn rate_limiter(config: &AppConfig) -> Result<Option<Arc<dyn RateLimiter>>, StartupError> {
    use quill_infra::{InMemoryRateLimiter, RateLimitConfig};

    let limiter = InMemoryRateLimiter::new(&RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window: config.rate_limit.window,
    })
    .map_err(|e| StartupError::RateLimit(e.to_string()))?;

    Ok(Some(Arc::new(limiter)))
}

#[cfg(not(feature = "rate-limit"))]
fn rate_limiter(_config: &AppConfig) -> Result<Option<Arc<dyn RateLimiter>>, StartupError> {
    Ok(None)
}
