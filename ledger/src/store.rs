//! # LedgerStore: Embedded Persistence
//!
//! Persists a chain in sled's embedded key-value store. The chain itself
//! has no opinion about storage; this is for drivers that need the chain to
//! survive a restart.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                 | Value                       |
//! |------------|---------------------|-----------------------------|
//! | `records`  | `position` (8B BE)  | JSON of the four record fields |
//! | `metadata` | key (UTF-8)         | value (bytes)               |
//!
//! Positions are stored big-endian so sled's lexicographic ordering matches
//! chain order and a full scan yields records genesis-first.
//!
//! Records are stored exactly as they are in memory, stale digests and
//! broken links included. Loading never repairs anything.

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Batch, Db, Transactional, Tree};
use std::path::Path;

use crate::chain::Chain;
use crate::config::{METADATA_TREE, META_ALGORITHM, RECORDS_TREE};
use crate::digest::DigestAlgorithm;
use crate::error::{LedgerError, LedgerResult};
use crate::record::Record;

/// sled-backed persistence for a single chain.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db: Db,
    records: Tree,
    metadata: Tree,
}

impl LedgerStore {
    /// Open or create a store at the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a store that lives in memory and is discarded on drop.
    pub fn open_temporary() -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> LedgerResult<Self> {
        let records = db.open_tree(RECORDS_TREE)?;
        let metadata = db.open_tree(METADATA_TREE)?;
        Ok(Self {
            db,
            records,
            metadata,
        })
    }

    /// Replace everything stored with `chain`. Records and the algorithm
    /// metadata are written in one transaction, so a store never pairs
    /// records with another chain's algorithm.
    pub fn save_chain(&self, chain: &Chain) -> LedgerResult<()> {
        let mut batch = Batch::default();
        for key in self.records.iter().keys() {
            batch.remove(key?);
        }
        for record in chain.records() {
            batch.insert(record.position().to_be_bytes().to_vec(), serde_json::to_vec(record)?);
        }

        let algorithm = chain.algorithm().as_str();
        (&self.records, &self.metadata)
            .transaction(|(records, metadata)| {
                records.apply_batch(&batch)?;
                metadata.insert(META_ALGORITHM, algorithm.as_bytes())?;
                Ok::<(), ConflictableTransactionError<LedgerError>>(())
            })
            .map_err(|err| match err {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => LedgerError::Storage(err),
            })?;
        self.db.flush()?;

        tracing::info!(records = chain.len(), algorithm = %chain.algorithm(), "chain saved");
        Ok(())
    }

    /// Write (or overwrite) a single record. Use after an append or an edit
    /// to an already saved chain.
    pub fn put_record(&self, record: &Record) -> LedgerResult<()> {
        self.records
            .insert(record.position().to_be_bytes(), serde_json::to_vec(record)?)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load the stored chain, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Corrupt`] if keys are malformed or positions have
    /// gaps, [`LedgerError::UnknownAlgorithm`] if the metadata names an
    /// algorithm this build does not support.
    pub fn load_chain(&self) -> LedgerResult<Option<Chain>> {
        if self.records.is_empty() {
            return Ok(None);
        }

        let algorithm = self.algorithm()?;
        let mut records = Vec::with_capacity(self.records.len());
        for entry in self.records.iter() {
            let (key, value) = entry?;
            let position = u64::from_be_bytes(
                key.as_ref()
                    .try_into()
                    .map_err(|_| LedgerError::Corrupt("invalid position key".to_string()))?,
            );
            let record: Record = serde_json::from_slice(&value)?;
            if record.position() != position {
                return Err(LedgerError::Corrupt(format!(
                    "record under key {position} claims position {}",
                    record.position()
                )));
            }
            records.push(record);
        }

        let chain = Chain::from_records(algorithm, records)?;
        tracing::info!(records = chain.len(), %algorithm, "chain loaded");
        Ok(Some(chain))
    }

    /// The stored digest algorithm, defaulting when no metadata exists.
    pub fn algorithm(&self) -> LedgerResult<DigestAlgorithm> {
        match self.metadata.get(META_ALGORITHM)? {
            Some(bytes) => {
                let name = std::str::from_utf8(&bytes)
                    .map_err(|_| LedgerError::Corrupt("algorithm is not UTF-8".to_string()))?;
                name.parse()
            }
            None => Ok(DigestAlgorithm::default()),
        }
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Block until pending writes are durable.
    pub fn flush(&self) -> LedgerResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
