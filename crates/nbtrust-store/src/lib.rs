//! Persistent allow-list of notebook signatures.
//!
//! This crate provides:
//! - `SignatureStore`, an async handle over one SQLite database holding the
//!   `nbsignatures` table used by nbformat
//! - Recency tracking (`last_seen`) refreshed on every successful check
//! - Capacity-bounded eviction that keeps the most recently seen 75%
//!
//! The table layout is shared with nbformat's `NotebookNotary`, so a database
//! written here can be read there and vice versa.

#![deny(missing_docs)]

/// Monotonic `last_seen` timestamps.
pub mod clock;
/// Error types for store operations.
pub mod error;
/// Open-time options.
pub mod options;
/// SQLite-backed signature store.
pub mod store;

pub use clock::{format_timestamp, parse_timestamp, LastSeenClock, TIMESTAMP_FORMAT};
pub use error::StoreError;
pub use options::{StoreOptions, DEFAULT_CACHE_SIZE, TRIM_RATIO};
pub use store::{SignatureRecord, SignatureStore};
