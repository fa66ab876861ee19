//! Migration framework
//!
//! Applies the embedded schema migrations in order, recording each in
//! `schema_version` with a checksum so an edited migration is detected.

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
