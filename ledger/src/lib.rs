// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashledger: Tamper-Evident Append-Only Ledger
//!
//! A chain of records where each record carries the digest of the one before
//! it. Change any historical record and the chain stops adding up: either
//! the record no longer hashes to its stored digest, or its successor points
//! at a digest that no longer exists.
//!
//! The library detects tampering. It does not prevent it, and it does not
//! heal it: payloads stay editable so the detection can be observed, and
//! repair is a separate explicit call.
//!
//! ## Architecture
//!
//! - **config**: Genesis constants, digest parameters, storage names.
//! - **digest**: The digest function and the choice of hash algorithm.
//! - **payload**: Record content and its canonical encoding.
//! - **record**: A single chain entry.
//! - **chain**: Genesis, append with linking, verification, relinking.
//! - **shared**: Lock-guarded handle for multi-threaded callers.
//! - **store**: Optional sled persistence.
//!
//! ## Example
//!
//! ```
//! use hashledger::Chain;
//! use serde_json::json;
//!
//! let mut chain = Chain::new();
//! chain.append(json!({ "amount": 42 })).unwrap();
//! assert!(chain.validate());
//!
//! chain.get_mut(0).unwrap().set_payload("Tampered");
//! assert!(!chain.validate());
//! ```

pub mod chain;
pub mod config;
pub mod digest;
pub mod error;
pub mod payload;
pub mod record;
pub mod shared;
pub mod store;

pub use chain::{Chain, ChainFault};
pub use digest::{compute_digest, DigestAlgorithm};
pub use error::{LedgerError, LedgerResult};
pub use payload::Payload;
pub use record::Record;
pub use shared::SharedChain;
pub use store::LedgerStore;
