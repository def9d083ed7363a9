//! Hashing primitives for ledgerscope.
//!
//! The ledger node keys everything by SHA-512 truncated to its first 256
//! bits ("SHA-512-half"). Stored data depends on that exact truncation, so
//! no other hash function may be substituted.
//!
//! Hashing is delegated to `sha2`.

pub mod hasher;
pub mod ledger;

pub use hasher::{sha512_half, NodeHasher};
pub use ledger::{HashPrefix, LedgerHasher};
