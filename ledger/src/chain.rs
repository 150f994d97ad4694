//! # Chain
//!
//! An ordered, append-only sequence of [`Record`]s. The chain starts with a
//! genesis record and only ever grows at the tip.
//!
//! ## Integrity
//!
//! A chain is consistent when, scanning positions in ascending order:
//!
//! 1. every record's stored digest equals a fresh recomputation from its
//!    current fields (genesis included), and
//! 2. every record after genesis carries its predecessor's current stored
//!    digest as `previous_digest`.
//!
//! Neither property is enforced on mutation. Records handed out through
//! [`Chain::get_mut`] can be edited freely; [`Chain::verify`] reports the
//! first place where the chain stopped adding up. Repair is never implicit:
//! a caller that wants the chain healed must call [`Chain::relink_from`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_DIGEST_ALGORITHM;
use crate::digest::DigestAlgorithm;
use crate::error::{LedgerError, LedgerResult};
use crate::payload::Payload;
use crate::record::Record;

// ---------------------------------------------------------------------------
// ChainFault
// ---------------------------------------------------------------------------

/// The first inconsistency found by [`Chain::verify`].
///
/// This is an outcome, not an error: a broken chain is a perfectly normal
/// thing to observe.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainFault {
    /// The record's fields no longer hash to its stored digest.
    #[error("record {position} digest mismatch: stored={stored}, computed={computed}")]
    DigestMismatch {
        position: u64,
        stored: String,
        /// Empty when the payload could not be serialized at all.
        computed: String,
    },

    /// The record points at a digest its predecessor no longer has.
    #[error("record {position} link broken: expected={expected}, found={found}")]
    BrokenLink {
        position: u64,
        /// The predecessor's current stored digest.
        expected: String,
        /// The record's `previous_digest`.
        found: String,
    },
}

impl ChainFault {
    /// Position of the offending record.
    pub fn position(&self) -> u64 {
        match self {
            ChainFault::DigestMismatch { position, .. } | ChainFault::BrokenLink { position, .. } => {
                *position
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Tamper-evident ordered chain of records. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chain {
    algorithm: DigestAlgorithm,
    records: Vec<Record>,
}

impl Chain {
    /// Create a chain holding only the genesis record, using the default
    /// digest algorithm.
    pub fn new() -> Self {
        Self::with_algorithm(DEFAULT_DIGEST_ALGORITHM)
    }

    /// Create a chain holding only the genesis record.
    pub fn with_algorithm(algorithm: DigestAlgorithm) -> Self {
        // The genesis payload is a constant raw string; canonicalizing it
        // cannot fail.
        let genesis = match Record::genesis(algorithm) {
            Ok(record) => record,
            Err(err) => unreachable!("genesis payload failed to serialize: {err}"),
        };
        Self {
            algorithm,
            records: vec![genesis],
        }
    }

    /// Rebuild a chain from persisted records, keeping every stored digest
    /// and link exactly as found so earlier tampering survives a reload.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Corrupt`] when the list is empty or positions are not
    /// `0, 1, 2, ...`.
    pub fn from_records(algorithm: DigestAlgorithm, mut records: Vec<Record>) -> LedgerResult<Self> {
        if records.is_empty() {
            return Err(LedgerError::Corrupt("chain has no genesis record".to_string()));
        }
        for (index, record) in records.iter_mut().enumerate() {
            if record.position() != index as u64 {
                return Err(LedgerError::Corrupt(format!(
                    "expected position {index}, found {}",
                    record.position()
                )));
            }
            record.set_algorithm(algorithm);
        }
        Ok(Self { algorithm, records })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Read-only view of all records in chain order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records, genesis included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: a chain holds at least its genesis record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: u64) -> Option<&Record> {
        usize::try_from(position).ok().and_then(|i| self.records.get(i))
    }

    /// Mutable access for editing a record in place. Nothing is recomputed
    /// on the caller's behalf.
    pub fn get_mut(&mut self, position: u64) -> Option<&mut Record> {
        usize::try_from(position)
            .ok()
            .and_then(move |i| self.records.get_mut(i))
    }

    /// The tip of the chain.
    pub fn latest(&self) -> &Record {
        // Every constructor leaves at least the genesis record in place and
        // records are never removed.
        match self.records.last() {
            Some(record) => record,
            None => unreachable!("chain lost its genesis record"),
        }
    }

    /// Append a new record linked to the current tip.
    ///
    /// The new record's `previous_digest` is a copy of the tip's stored
    /// digest at this moment.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Serialization`] if the payload cannot be canonically
    /// serialized. The chain is unchanged in that case.
    pub fn append(&mut self, payload: impl Into<Payload>) -> LedgerResult<&Record> {
        let position = self.records.len() as u64;
        let previous_digest = self.latest().digest().to_string();
        let record = Record::new(self.algorithm, position, payload.into(), previous_digest)?;

        tracing::debug!(position, digest = %record.digest(), "record appended");

        self.records.push(record);
        Ok(self.latest())
    }

    /// Serialize `value` into a structured payload and append it.
    pub fn append_serialize<T: Serialize + ?Sized>(&mut self, value: &T) -> LedgerResult<&Record> {
        let payload = Payload::from_serialize(value)?;
        self.append(payload)
    }

    /// Check the whole chain, stopping at the first inconsistency.
    pub fn verify(&self) -> Result<(), ChainFault> {
        for (index, record) in self.records.iter().enumerate() {
            let computed = record.compute_digest().unwrap_or_default();
            if computed != record.digest() {
                let fault = ChainFault::DigestMismatch {
                    position: record.position(),
                    stored: record.digest().to_string(),
                    computed,
                };
                tracing::warn!(%fault, "chain verification failed");
                return Err(fault);
            }

            if index == 0 {
                continue;
            }

            let previous = &self.records[index - 1];
            if record.previous_digest() != previous.digest() {
                let fault = ChainFault::BrokenLink {
                    position: record.position(),
                    expected: previous.digest().to_string(),
                    found: record.previous_digest().to_string(),
                };
                tracing::warn!(%fault, "chain verification failed");
                return Err(fault);
            }
        }
        Ok(())
    }

    /// True iff [`Chain::verify`] finds nothing wrong. Read-only.
    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    /// Relink every record from `from` to the tip: copy the predecessor's
    /// current digest into `previous_digest`, then recompute the digest.
    ///
    /// This is an explicit repair step. Genesis cannot be relinked, so a
    /// `from` of 0 starts at 1.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if `from` is past the tip, or a
    /// serialization error from a record's payload. Records before the
    /// failing one stay relinked.
    pub fn relink_from(&mut self, from: u64) -> LedgerResult<()> {
        let start = usize::try_from(from.max(1)).map_err(|_| LedgerError::NotFound(from))?;
        if start >= self.records.len() {
            if from == 0 {
                return Ok(());
            }
            return Err(LedgerError::NotFound(from));
        }

        for index in start..self.records.len() {
            let previous_digest = self.records[index - 1].digest().to_string();
            let record = &mut self.records[index];
            record.set_previous_digest(previous_digest);
            record.recompute_digest()?;
        }

        tracing::debug!(from = start, tip = self.records.len() - 1, "suffix relinked");
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized shape of a chain: the algorithm plus the record list.
#[derive(Deserialize)]
struct ChainSnapshot {
    algorithm: DigestAlgorithm,
    records: Vec<Record>,
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let snapshot = ChainSnapshot::deserialize(deserializer)?;
        Chain::from_records(snapshot.algorithm, snapshot.records).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::compute_digest;
    use serde_json::json;
    use std::collections::HashMap;

    fn chain_of(n: u64) -> Chain {
        let mut chain = Chain::new();
        for i in 0..n {
            chain.append(json!({ "amount": i })).unwrap();
        }
        chain
    }

    #[test]
    fn genesis_chain_properties() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());

        let genesis = chain.latest();
        assert_eq!(genesis.position(), 0);
        assert_eq!(genesis.previous_digest(), "0");
        assert_eq!(
            genesis.digest(),
            compute_digest(chain.algorithm(), 0, "0", &Payload::from("Genesis Block")).unwrap()
        );
    }

    #[test]
    fn genesis_only_chain_is_valid() {
        assert!(Chain::new().validate());
        assert!(Chain::with_algorithm(DigestAlgorithm::Blake3).validate());
    }

    #[test]
    fn genesis_is_deterministic() {
        assert_eq!(Chain::new(), Chain::new());
    }

    #[test]
    fn append_links_to_tip() {
        let mut chain = Chain::new();
        let tip_digest = chain.latest().digest().to_string();

        let record = chain.append(json!({"amount": 42})).unwrap().clone();
        assert_eq!(record.position(), 1);
        assert_eq!(record.previous_digest(), tip_digest);
        assert_eq!(
            record.digest(),
            compute_digest(chain.algorithm(), 1, &tip_digest, &Payload::from(json!({"amount": 42})))
                .unwrap()
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn untouched_chain_validates() {
        assert!(chain_of(25).validate());
    }

    #[test]
    fn payload_edit_without_recompute_is_detected() {
        let mut chain = chain_of(4);
        chain.get_mut(2).unwrap().set_payload(json!({"amount": 9999}));

        assert!(!chain.validate());
        assert!(matches!(
            chain.verify(),
            Err(ChainFault::DigestMismatch { position: 2, .. })
        ));
    }

    #[test]
    fn genesis_edit_without_recompute_is_detected() {
        let mut chain = Chain::new();
        chain.append(json!({"amount": 42})).unwrap();
        assert!(chain.validate());

        chain.get_mut(0).unwrap().set_payload("Tampered");
        assert!(!chain.validate());
        assert_eq!(chain.verify().unwrap_err().position(), 0);
    }

    #[test]
    fn edit_and_recompute_breaks_the_next_link() {
        let mut chain = chain_of(4);
        chain
            .get_mut(2)
            .unwrap()
            .set_payload_and_recompute(json!({"amount": 9999}))
            .unwrap();

        assert!(chain.get(2).unwrap().is_consistent());
        assert!(!chain.validate());
        assert!(matches!(
            chain.verify(),
            Err(ChainFault::BrokenLink { position: 3, .. })
        ));
    }

    #[test]
    fn edit_and_recompute_at_tip_stays_valid() {
        // Nothing links to the tip, so a consistent edit there is invisible.
        let mut chain = chain_of(3);
        chain.get_mut(3).unwrap().set_payload_and_recompute("rewritten").unwrap();
        assert!(chain.validate());
    }

    #[test]
    fn relink_restores_validity() {
        let mut chain = chain_of(6);
        chain
            .get_mut(2)
            .unwrap()
            .set_payload_and_recompute(json!({"amount": -1}))
            .unwrap();
        assert!(!chain.validate());

        chain.relink_from(3).unwrap();
        assert!(chain.validate());
    }

    #[test]
    fn manual_relink_restores_validity() {
        let mut chain = chain_of(5);
        chain.get_mut(1).unwrap().set_payload_and_recompute("edited").unwrap();

        for position in 2..chain.len() as u64 {
            let previous = chain.get(position - 1).unwrap().digest().to_string();
            let record = chain.get_mut(position).unwrap();
            record.set_previous_digest(previous);
            record.recompute_digest().unwrap();
        }
        assert!(chain.validate());
    }

    #[test]
    fn relink_past_tip_is_not_found() {
        let mut chain = chain_of(2);
        assert!(matches!(chain.relink_from(3), Err(LedgerError::NotFound(3))));
        assert!(Chain::new().relink_from(0).is_ok());
    }

    #[test]
    fn first_fault_wins() {
        let mut chain = chain_of(5);
        chain.get_mut(4).unwrap().set_payload("late");
        chain.get_mut(1).unwrap().set_payload("early");
        assert_eq!(chain.verify().unwrap_err().position(), 1);
    }

    #[test]
    fn corrupted_link_is_detected() {
        let mut chain = chain_of(2);
        let record = chain.get_mut(1).unwrap();
        let bogus = "f".repeat(64);
        record.set_previous_digest(bogus);
        assert!(!chain.validate());
    }

    #[test]
    fn validate_is_idempotent_and_read_only() {
        let mut chain = chain_of(3);
        chain.get_mut(1).unwrap().set_payload("x");
        let before = chain.clone();

        let first = chain.validate();
        let second = chain.validate();
        assert_eq!(first, second);
        assert_eq!(chain, before);
    }

    #[test]
    fn append_after_tamper_links_to_stale_digest() {
        let mut chain = chain_of(2);
        chain.get_mut(2).unwrap().set_payload("tampered");
        let stale = chain.latest().digest().to_string();

        chain.append("next").unwrap();
        assert_eq!(chain.latest().previous_digest(), stale);
        assert!(!chain.validate());
    }

    #[test]
    fn append_serialize_uses_structured_payload() {
        let mut chain = Chain::new();
        let record = chain.append_serialize(&json!({"amount": 7})).unwrap();
        assert_eq!(record.payload(), &Payload::from(json!({"amount": 7})));
    }

    #[test]
    fn append_serialize_failure_leaves_chain_untouched() {
        let mut chain = chain_of(1);
        let before = chain.clone();

        let mut unrepresentable: HashMap<(u8, u8), u8> = HashMap::new();
        unrepresentable.insert((1, 2), 3);

        let err = chain.append_serialize(&unrepresentable).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain, before);
        assert!(chain.validate());
    }

    #[test]
    fn append_serialize_failure_on_genesis_only_chain() {
        let mut chain = Chain::new();
        let mut unrepresentable: HashMap<(u8, u8), u8> = HashMap::new();
        unrepresentable.insert((0, 0), 0);

        assert!(matches!(
            chain.append_serialize(&unrepresentable),
            Err(LedgerError::Serialization(_))
        ));
        assert_eq!(chain.len(), 1);
        assert!(chain.validate());
    }

    #[test]
    fn snapshot_roundtrip_preserves_tampering() {
        let mut chain = chain_of(3);
        chain.get_mut(2).unwrap().set_payload("tampered");

        let json = serde_json::to_string(&chain).expect("serialize");
        let recovered: Chain = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered, chain);
        assert!(!recovered.validate());
    }

    #[test]
    fn from_records_rejects_gaps() {
        let chain = chain_of(3);
        let mut records = chain.records().to_vec();
        records.remove(1);
        assert!(matches!(
            Chain::from_records(chain.algorithm(), records),
            Err(LedgerError::Corrupt(_))
        ));
        assert!(matches!(
            Chain::from_records(DigestAlgorithm::Sha256, Vec::new()),
            Err(LedgerError::Corrupt(_))
        ));
    }

    #[test]
    fn concrete_scenario() {
        let mut chain = Chain::new();
        chain.append(json!({"amount": 42})).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.validate());

        chain.get_mut(0).unwrap().set_payload("Tampered");
        assert!(!chain.validate());
    }
}
