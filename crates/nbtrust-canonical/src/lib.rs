//! Canonical serialization and keyed digests for notebook documents.
//!
//! The token stream produced here reproduces, byte for byte, what nbformat's
//! `yield_everything` feeds into its HMAC. Every rule that influences the
//! signed payload (key order, literal spelling, float formatting) lives in
//! this crate so that the store and orchestrator never need to know about it.
//!
#![deny(missing_docs)]

/// Keyed digests over the canonical token stream.
pub mod digest;
/// Float and integer text rendering.
pub mod number;
/// Removal of the embedded notebook signature before digesting.
pub mod omit;
/// Locale-independent key ordering.
pub mod ordering;
/// Lazy canonical token stream.
pub mod serializer;
/// Validation helpers used by canonical types.
pub mod validation;
/// Document value model and JSON boundary.
pub mod value;

pub use digest::{digest, DigestAlg, DigestError};
pub use number::format_float;
pub use omit::omit_signature;
pub use ordering::compare_code_points;
pub use serializer::{canonical_string, tokens, Tokens};
pub use validation::ValidationError;
pub use value::{CanonicalizationError, Integer, Mapping, Value};
