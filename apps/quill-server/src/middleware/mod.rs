//! Middleware, extractors and error responses.

pub mod auth;
pub mod error;
pub mod rate_limit;

pub use auth::{CurrentUser, MaybeUser};
pub use error::{AppResult, OrRespond};
pub use rate_limit::RateLimitMiddleware;
