//! Command protocol spoken to a ledger node.
//!
//! Both transports carry the same JSON envelope:
//!
//! ```json
//! { "method": "ledger", "id": 1, "params": [ { "ledger": 5, "full": false, ... } ] }
//! ```
//!
//! and expect a reply object whose `result.status` is `"success"` when the
//! node had data.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod ledger;
pub mod message;

pub use codec::CommandCodec;
pub use endpoint::{ConnectionDescriptor, TransportKind};
pub use error::{ProtocolError, ProtocolResult};
pub use ledger::{LedgerSummary, TransactionEntry, TransactionRecord};
pub use message::{methods, CommandRequest, LedgerParams, LedgerSelector, ReplyEnvelope};
