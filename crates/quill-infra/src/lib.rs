//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains database, session and rate-limit integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `rate-limit` - Credential throttling via governor
//! - `redis` - Redis-backed session store

pub mod auth;
pub mod database;
pub mod session;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use auth::{Argon2PasswordService, PasswordConfig};
pub use database::{InMemoryPostRepository, InMemoryUserRepository};
pub use session::InMemorySessionStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostRepository, PostgresUserRepository};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use session::{RedisSessionConfig, RedisSessionStore};
