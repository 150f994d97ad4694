//! Error types for the ledger core.
//!
//! Only serialization can fail inside the chain itself. The remaining
//! variants come from the persistence layer and from decoding caller input.
//! An inconsistent chain is NOT an error: see [`crate::chain::ChainFault`].

use thiserror::Error;

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A payload could not be canonically serialized for digesting or
    /// persisted form could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The embedded store reported a failure.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// No record exists at the requested position.
    #[error("no record at position {0}")]
    NotFound(u64),

    /// Persisted data is structurally unusable (gaps, empty chain, bad keys).
    #[error("corrupt ledger data: {0}")]
    Corrupt(String),

    /// A digest algorithm name was not recognized.
    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type LedgerResult<T> = Result<T, LedgerError>;
