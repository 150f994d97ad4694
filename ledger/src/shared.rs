//! # Shared Chain Handle
//!
//! [`Chain`] itself is single-owner. When several threads need the same
//! chain, wrap it in a [`SharedChain`]: appends and payload edits each run
//! under one write lock, so the read-then-recompute sequence of an edit
//! cannot interleave with an append that snapshots the tip digest.
//!
//! - `parking_lot::RwLock` guards the chain. Validation takes a read lock
//!   and can run alongside other readers.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::chain::{Chain, ChainFault};
use crate::error::{LedgerError, LedgerResult};
use crate::payload::Payload;
use crate::record::Record;

/// Cloneable, thread-safe handle to a single chain.
#[derive(Clone, Debug, Default)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append under the write lock and return a copy of the new record.
    pub fn append(&self, payload: impl Into<Payload>) -> LedgerResult<Record> {
        let mut chain = self.inner.write();
        let record = chain.append(payload)?.clone();
        Ok(record)
    }

    /// Replace the payload at `position`, recomputing the digest when
    /// `recompute` is set. Both steps happen under one write lock.
    pub fn edit(
        &self,
        position: u64,
        payload: impl Into<Payload>,
        recompute: bool,
    ) -> LedgerResult<()> {
        let mut chain = self.inner.write();
        let record = chain
            .get_mut(position)
            .ok_or(LedgerError::NotFound(position))?;
        if recompute {
            record.set_payload_and_recompute(payload)
        } else {
            record.set_payload(payload);
            Ok(())
        }
    }

    pub fn validate(&self) -> bool {
        self.inner.read().validate()
    }

    pub fn verify(&self) -> Result<(), ChainFault> {
        self.inner.read().verify()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Stored digest of the current tip.
    pub fn latest_digest(&self) -> String {
        self.inner.read().latest().digest().to_string()
    }

    /// Point-in-time copy of the whole chain.
    pub fn snapshot(&self) -> Chain {
        self.inner.read().clone()
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}
