//! Subcommand implementations.

pub mod digest;
pub mod secret;
pub mod store;
pub mod trust;
