//! Read-only access to a ledger node's on-disk state.
//!
//! Two backing namespaces are consumed, never implemented, here:
//!
//! - a relational index of ledger headers, queryable by hash or sequence
//!   ([`LedgerHeaderEngine`], resolved through [`LedgerIndex`]);
//! - a key-value namespace mapping a 32-byte digest to an encoded node
//!   ([`KeyValueEngine`], resolved through [`ContentAddressedStore`]).
//!
//! [`LocalLedgerStore`] composes the two.
//!
//! # Design Rules
//!
//! 1. Every node read recomputes the payload digest; a mismatch fails closed.
//! 2. A missing key is `Ok(None)`, never an error and never a zeroed record.
//! 3. The three projections of a ledger (hash, parent hash, sequence) all go
//!    through one lookup so they cannot disagree.
//! 4. Concurrent reads are always safe; locking is the engines' business.

pub mod cas;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod local;
pub mod memory;
pub mod node;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;
pub mod sqlite;

pub use cas::ContentAddressedStore;
pub use config::StoreConfig;
pub use engine::{KeyValueEngine, LedgerHeaderEngine};
pub use error::{StoreError, StoreResult};
pub use index::LedgerIndex;
pub use local::LocalLedgerStore;
pub use memory::{InMemoryKeyValue, InMemoryLedgerHeaders};
pub use node::{NodeBlob, NodeKind, NODE_HEADER_LEN};
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::RocksDbNodeEngine;
pub use sqlite::SqliteLedgerHeaders;
