//! # Ledger Configuration & Constants
//!
//! Every fixed value the chain depends on lives here. Changing any of the
//! genesis constants changes the genesis digest, which invalidates every
//! chain persisted under the old values, so treat them as frozen.

use crate::digest::DigestAlgorithm;

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Payload carried by the genesis record. Stored as a raw string, so it is
/// hashed verbatim.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Sentinel previous-digest of the genesis record. Not a valid
/// 64-character digest, since there is no predecessor.
pub const GENESIS_PREVIOUS_DIGEST: &str = "0";

/// Position of the genesis record.
pub const GENESIS_POSITION: u64 = 0;

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// Algorithm used when a chain is created without an explicit choice.
/// SHA-256 keeps digests comparable with other SHA-256 hash chains.
pub const DEFAULT_DIGEST_ALGORITHM: DigestAlgorithm = DigestAlgorithm::Sha256;

/// Digest output length in bytes. Both supported algorithms emit 256 bits.
pub const DIGEST_OUTPUT_LENGTH: usize = 32;

/// Length of a rendered digest: two lowercase hex characters per byte.
pub const DIGEST_HEX_LENGTH: usize = DIGEST_OUTPUT_LENGTH * 2;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// sled tree holding records keyed by big-endian position.
pub const RECORDS_TREE: &str = "records";

/// sled tree holding chain-level metadata.
pub const METADATA_TREE: &str = "metadata";

/// Metadata key for the chain's digest algorithm name.
pub const META_ALGORITHM: &[u8] = b"digest_algorithm";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_hex_length_matches_output_length() {
        assert_eq!(DIGEST_HEX_LENGTH, 64);
    }

    #[test]
    fn genesis_sentinel_is_not_a_digest() {
        assert_ne!(GENESIS_PREVIOUS_DIGEST.len(), DIGEST_HEX_LENGTH);
    }
}
