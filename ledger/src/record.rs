//! # Records
//!
//! A record is one entry of the chain: a position, a payload, the digest of
//! its predecessor at link time, and its own digest.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Record                                             │
//! │  ├── position: u64            (0 = genesis)         │
//! │  ├── payload: Payload         (editable)            │
//! │  ├── previous_digest: String  ("0" = genesis)       │
//! │  └── digest: String   H(position || prev || payload)│
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The stored digest is NOT kept in sync automatically. Editing the payload
//! leaves the old digest in place until [`Record::recompute_digest`] is
//! called, and that gap is exactly what chain validation detects.

use serde::{Deserialize, Serialize};

use crate::config::{GENESIS_PAYLOAD, GENESIS_POSITION, GENESIS_PREVIOUS_DIGEST};
use crate::digest::{compute_digest, DigestAlgorithm};
use crate::error::LedgerResult;
use crate::payload::Payload;

/// One entry in a [`crate::chain::Chain`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    position: u64,
    payload: Payload,
    previous_digest: String,
    digest: String,
    /// Chain-level setting, carried so a record can recompute itself.
    #[serde(skip)]
    algorithm: DigestAlgorithm,
}

impl Record {
    /// Create a record and compute its digest immediately.
    ///
    /// `previous_digest` may be empty for an unlinked record.
    ///
    /// # Errors
    ///
    /// Fails only if the payload cannot be canonically serialized.
    pub fn new(
        algorithm: DigestAlgorithm,
        position: u64,
        payload: Payload,
        previous_digest: impl Into<String>,
    ) -> LedgerResult<Self> {
        let previous_digest = previous_digest.into();
        let digest = compute_digest(algorithm, position, &previous_digest, &payload)?;
        Ok(Self {
            position,
            payload,
            previous_digest,
            digest,
            algorithm,
        })
    }

    /// Construct the genesis record: position 0, the fixed genesis payload
    /// and the `"0"` sentinel as previous digest.
    pub fn genesis(algorithm: DigestAlgorithm) -> LedgerResult<Self> {
        Self::new(
            algorithm,
            GENESIS_POSITION,
            Payload::from(GENESIS_PAYLOAD),
            GENESIS_PREVIOUS_DIGEST,
        )
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn previous_digest(&self) -> &str {
        &self.previous_digest
    }

    /// The stored digest, which may be stale after an edit.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub(crate) fn set_algorithm(&mut self, algorithm: DigestAlgorithm) {
        self.algorithm = algorithm;
    }

    /// Derive a fresh digest from the current fields. Does not store it.
    pub fn compute_digest(&self) -> LedgerResult<String> {
        compute_digest(
            self.algorithm,
            self.position,
            &self.previous_digest,
            &self.payload,
        )
    }

    /// Replace the stored digest with a fresh one.
    pub fn recompute_digest(&mut self) -> LedgerResult<()> {
        let fresh = self.compute_digest()?;
        tracing::debug!(position = self.position, digest = %fresh, "digest recomputed");
        self.digest = fresh;
        Ok(())
    }

    /// Replace the payload and leave the stored digest as it was.
    pub fn set_payload(&mut self, payload: impl Into<Payload>) {
        self.payload = payload.into();
    }

    /// Replace the payload, then recompute the digest.
    ///
    /// On a serialization failure the new payload is kept and the old digest
    /// stays in place, so the record reads as inconsistent.
    pub fn set_payload_and_recompute(&mut self, payload: impl Into<Payload>) -> LedgerResult<()> {
        self.set_payload(payload);
        self.recompute_digest()
    }

    /// Replace the previous-digest link and leave the stored digest as it
    /// was. Used when relinking a suffix by hand.
    pub fn set_previous_digest(&mut self, previous_digest: impl Into<String>) {
        self.previous_digest = previous_digest.into();
    }

    /// True when the stored digest matches a fresh recomputation. A payload
    /// that can no longer be serialized counts as inconsistent.
    pub fn is_consistent(&self) -> bool {
        match self.compute_digest() {
            Ok(fresh) => fresh == self.digest,
            Err(_) => false,
        }
    }
}
