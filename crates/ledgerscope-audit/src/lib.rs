//! Operations over ranges of ledgers.
//!
//! - [`RangeProbe`] records what a node reports for each sequence;
//! - [`RangeImporter`] copies ledgers and their transactions into a
//!   [`LedgerSink`];
//! - [`CrossCheck`] and [`ChainVerifier`] compare the node against local
//!   state and local state against itself.
//!
//! Remote access goes through [`LedgerSource`], which
//! [`LedgerNodeClient`](ledgerscope_client::LedgerNodeClient) implements.

pub mod check;
pub mod error;
pub mod import;
pub mod probe;
pub mod source;

pub use check::{ChainReport, ChainVerifier, CrossCheck, CrossCheckReport, Discrepancy};
pub use error::{AuditError, AuditResult};
pub use import::{ImportReport, LedgerSink, RangeImporter, RecordingSink};
pub use probe::{Observation, ObservedHeader, RangeProbe};
pub use source::LedgerSource;
