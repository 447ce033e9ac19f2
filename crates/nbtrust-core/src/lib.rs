//! Notebook trust: sign, check, unsign and filter Jupyter notebooks.
//!
//! This crate provides:
//! - `Trust`, which digests notebooks with a per-installation secret and
//!   keeps the approved digests in a `SignatureStore`
//! - Loading notebooks from paths or in-memory documents (`AsNotebook`)
//! - Secret resolution from the Jupyter data directory (`SecretCache`)
//! - `TrustConfig` and one-call wrappers that open, operate and close
//!
//! Core invariants:
//! - Only documents with a numeric `nbformat >= 3` can be trusted; anything
//!   else reports `false` and never reaches the store
//! - The embedded `metadata.signature` field never contributes to a digest
//! - Signatures are compatible with nbformat's `NotebookNotary`
//!
#![deny(missing_docs)]

/// Configuration for opening a trust instance.
pub mod config;
/// Error types for trust operations.
pub mod errors;
/// Notebook references and loading.
pub mod notebook;
pub mod oneshot;
pub mod secret;
/// The trust orchestrator.
pub mod trust;

pub use config::TrustConfig;
pub use errors::TrustError;
pub use notebook::{is_trusted_format, load, AsNotebook, NotebookRef, NotebookSource, MIN_NBFORMAT};
pub use oneshot::{check, digest, filter, filter_with, sign, unsign};
pub use secret::{
    default_data_dir, ensure_secret, generate_secret, read_secret, SecretCache, DATABASE_FILE,
    SECRET_FILE,
};
pub use trust::Trust;

pub use nbtrust_canonical::{DigestAlg, Value};
pub use nbtrust_store::{SignatureStore, StoreOptions};
pub use secrecy::SecretString;
