//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Users, posts and sessions, the ports their storage must implement, and the
//! credential and post services that enforce ownership. No infrastructure
//! dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use services::{CredentialService, MutationOutcome, PostService};
