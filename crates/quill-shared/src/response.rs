//! JSON response bodies.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Active storage backend, `postgres` or `memory`.
    pub storage: String,
    /// RFC 3339 timestamp of the probe.
    pub timestamp: String,
}
