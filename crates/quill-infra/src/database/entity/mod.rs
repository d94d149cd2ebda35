//! SeaORM entities for the `users` and `blogs` tables.

pub mod blog;
pub mod user;
