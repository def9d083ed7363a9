//! Foundation types for ledgerscope.
//!
//! Every other ledgerscope crate depends on `ledgerscope-types`.
//!
//! # Key Types
//!
//! - [`Digest`]: 32-byte content identifier, used as lookup key and integrity value
//! - [`LedgerId`]: a ledger addressed by sequence number or by hash
//! - [`LedgerRecord`]: immutable snapshot of one ledger header

pub mod digest;
pub mod error;
pub mod ledger;

pub use digest::{Digest, DIGEST_LEN};
pub use error::TypeError;
pub use ledger::{LedgerId, LedgerRecord, LedgerSeq};
