//! # Record Digests
//!
//! A record's digest is a one-way hash over
//! `position (decimal text) || previous_digest || canonical(payload)`,
//! rendered as 64 lowercase hex characters.
//!
//! Two algorithms are supported and refuse to grow without a good reason:
//!
//! - **SHA-256**: the default. Interoperable with every other hash chain
//!   that picked SHA-256 and never looked back.
//! - **BLAKE3**: faster on every platform that matters, same 256-bit output.
//!
//! The choice is chain-wide. Nothing outside the chain depends on the byte
//! values, so switching algorithms only requires a fresh chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DIGEST_HEX_LENGTH;
use crate::error::{LedgerError, LedgerResult};
use crate::payload::Payload;

/// Cryptographic hash used to derive record digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 (FIPS 180-4).
    #[default]
    Sha256,
    /// BLAKE3 in its default 256-bit hashing mode.
    Blake3,
}

impl DigestAlgorithm {
    /// Lowercase name, as accepted by [`FromStr`] and stored in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hash a sequence of byte slices as if they were concatenated.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        match self {
            DigestAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                let mut output = [0u8; 32];
                output.copy_from_slice(&hasher.finalize());
                output
            }
            DigestAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                *hasher.finalize().as_bytes()
            }
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            _ => Err(LedgerError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Compute the digest of a record from its constituent fields.
///
/// Pure: identical inputs always produce identical output. The only failure
/// is a payload that cannot be canonically serialized.
///
/// # Example
///
/// ```
/// use hashledger::digest::{compute_digest, DigestAlgorithm};
/// use hashledger::payload::Payload;
///
/// let d = compute_digest(DigestAlgorithm::Sha256, 0, "0", &Payload::from("Genesis Block")).unwrap();
/// assert_eq!(d.len(), 64);
/// ```
pub fn compute_digest(
    algorithm: DigestAlgorithm,
    position: u64,
    previous_digest: &str,
    payload: &Payload,
) -> LedgerResult<String> {
    let position_text = position.to_string();
    let canonical = payload.canonical()?;
    let hash = algorithm.hash_parts(&[
        position_text.as_bytes(),
        previous_digest.as_bytes(),
        canonical.as_bytes(),
    ]);
    Ok(hex::encode(hash))
}

/// Returns true if `s` looks like a rendered digest: exactly 64 lowercase
/// hex characters.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LENGTH && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
