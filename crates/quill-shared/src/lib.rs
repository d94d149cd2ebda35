//! # Quill Shared
//!
//! Wire types for the HTML forms and the JSON health probe.
//! Kept free of domain types so any front-end can depend on it.

pub mod dto;
pub mod response;

pub use dto::{CredentialsForm, PostForm};
pub use response::HealthResponse;
