use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::omit::omit_signature;
use crate::serializer::{tokens, Tokens};
use crate::validation::ValidationError;
use crate::value::Value;

/// Hash functions accepted for notebook HMACs.
///
/// Identifiers are the lowercase `hashlib` names, which is also what the
/// signature table stores in its `algorithm` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-224.
    #[serde(rename = "sha224")]
    Sha224,
    /// SHA-256 (the nbformat default).
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    /// SHA-384.
    #[serde(rename = "sha384")]
    Sha384,
    /// SHA-512.
    #[serde(rename = "sha512")]
    Sha512,
}

impl DigestAlg {
    /// Identifier as stored alongside signatures.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex digest this algorithm produces.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha224 => 56,
            Self::Sha256 => 64,
            Self::Sha384 => 96,
            Self::Sha512 => 128,
        }
    }
}

impl FromStr for DigestAlg {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(ValidationError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for DigestAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a digest cannot be computed.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// The MAC rejected the key.
    #[error("secret rejected by {0} HMAC")]
    InvalidKey(DigestAlg),
}

/// Computes the notebook signature: HMAC(secret, canonical tokens) as
/// lowercase hex.
///
/// `metadata.signature` is excluded from the input, and the document itself
/// is left untouched.
pub fn digest(document: &Value, secret: &[u8], alg: DigestAlg) -> Result<String, DigestError> {
    let payload = omit_signature(document);
    let stream = tokens(&payload);
    match alg {
        DigestAlg::Sha224 => mac_hex::<Hmac<Sha224>>(secret, stream, alg),
        DigestAlg::Sha256 => mac_hex::<Hmac<Sha256>>(secret, stream, alg),
        DigestAlg::Sha384 => mac_hex::<Hmac<Sha384>>(secret, stream, alg),
        DigestAlg::Sha512 => mac_hex::<Hmac<Sha512>>(secret, stream, alg),
    }
}

fn mac_hex<M: Mac + KeyInit>(
    secret: &[u8],
    stream: Tokens<'_>,
    alg: DigestAlg,
) -> Result<String, DigestError> {
    let mut mac =
        <M as KeyInit>::new_from_slice(secret).map_err(|_| DigestError::InvalidKey(alg))?;
    for token in stream {
        mac.update(token.as_bytes());
    }
    Ok(hex::encode(mac.finalize().into_bytes()))
}
