//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - throttles credential submissions per client.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record an attempt for `key` and report whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;

    /// Forget buckets that have fully refilled.
    fn prune(&self) {}
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub reset_after: Duration,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}
