use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by trust operations.
///
/// A document without a recognized `nbformat` marker is not an error: the
/// operations report `false` for it instead.
#[derive(Error, Debug)]
pub enum TrustError {
    /// The signature store failed or refused the operation.
    #[error("signature store error: {0}")]
    Store(#[from] nbtrust_store::StoreError),
    /// A notebook file did not contain valid JSON.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] nbtrust_canonical::CanonicalizationError),
    /// The MAC could not be computed.
    #[error("digest error: {0}")]
    Digest(#[from] nbtrust_canonical::DigestError),
    /// A configuration value was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] nbtrust_canonical::ValidationError),
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The signing secret could not be resolved.
    #[error("secret error: {0}")]
    Secret(String),
}

impl TrustError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
