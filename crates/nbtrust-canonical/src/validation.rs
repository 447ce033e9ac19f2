use thiserror::Error;

/// Inputs rejected before any canonical text is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Text that should hold an integer is not a plain base-10 literal.
    #[error("'{0}' is not a base-10 integer literal")]
    MalformedInteger(String),
    /// An algorithm name outside the SHA-2 family.
    #[error("unsupported digest algorithm '{0}' (expected sha224, sha256, sha384 or sha512)")]
    UnsupportedAlgorithm(String),
    /// A value that must carry content was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
