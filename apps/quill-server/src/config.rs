//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use quill_infra::PasswordConfig;

const DEFAULT_SESSION_SECRET: &str = "change-me-in-production-this-is-not-a-secret";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("SESSION_SECRET must be at least 32 bytes")]
    WeakSessionSecret,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on in-memory storage.
    pub database: Option<DatabaseSettings>,
    pub session: SessionSettings,
    /// Selects the Redis session store when set.
    pub redis_url: Option<String>,
    pub password: PasswordConfig,
    pub rate_limit: RateLimitSettings,
    pub scheduler_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Apply pending migrations at startup.
    pub auto_migrate: bool,
}

#[derive(Clone)]
pub struct SessionSettings {
    /// Key material for signing the session cookie.
    pub secret: String,
    pub ttl: Duration,
    /// Mark the cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("secret", &"***")
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
    /// Key clients by `Forwarded` / `X-Forwarded-For` instead of the socket
    /// peer. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = match lookup("DATABASE_URL") {
            Some(url) => Some(DatabaseSettings {
                url,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
                auto_migrate: flag_or(&lookup, "DB_AUTO_MIGRATE", false)?,
            }),
            None => None,
        };

        let secret = session_secret(&lookup);
        let session = SessionSettings {
            secret,
            ttl: session_ttl(&lookup)?,
            secure_cookie: flag_or(&lookup, "SESSION_COOKIE_SECURE", false)?,
        };

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        };

        let rate_limit = RateLimitSettings {
            max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 20)?,
            window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 60)?),
            trust_proxy_headers: flag_or(&lookup, "TRUST_PROXY_HEADERS", false)?,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            database,
            session,
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            password,
            rate_limit,
            scheduler_enabled: flag_or(&lookup, "SCHEDULER_ENABLED", true)?,
        })
    }
}

fn session_secret(lookup: &impl Fn(&str) -> Option<String>) -> String {
    if let Some(secret) = lookup("SESSION_SECRET") {
        return secret;
    }

    let is_production = lookup("RUST_ENV")
        .map(|v| v == "production" || v == "prod")
        .unwrap_or(false);

    if is_production {
        tracing::error!(
            "SECURITY: Using default session secret in production! Set SESSION_SECRET environment variable."
        );
    } else {
        tracing::warn!("Using default session secret. Set SESSION_SECRET for production use.");
    }

    DEFAULT_SESSION_SECRET.to_string()
}

/// Session lifetime in whole hours; zero and overflowing values are rejected.
fn session_ttl(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    let hours: u64 = parse_or(lookup, "SESSION_TTL_HOURS", 24)?;

    hours
        .checked_mul(3600)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key: "SESSION_TTL_HOURS",
            value: hours.to_string(),
        })
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn flag_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
        }),
    }
}
