//! Application services - the credential and post controllers.
//!
//! Both services hold their collaborators as shared trait objects so the HTTP
//! layer can clone them into every worker.

mod credentials;
mod posts;

pub use credentials::CredentialService;
pub use posts::{MutationOutcome, PostService};
