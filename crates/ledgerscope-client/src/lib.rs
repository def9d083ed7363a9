//! Client for a remote ledger node.
//!
//! A [`LedgerNodeClient`] is built from a connection string. The scheme
//! picks the transport once, at construction:
//!
//! - `http`, `https`: [`RpcTransport`], one HTTP POST per command;
//! - `ws`, `wss`: [`StreamingTransport`], one persistent WebSocket.
//!
//! Per-command failures never raise. They are written to the client's
//! [`ActivityLog`] and the command returns `None`, so a long scan over many
//! ledgers survives isolated network hiccups. Only construction-time
//! validation errors propagate.

pub mod activity;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use activity::{ActivityError, ActivityLog};
pub use client::{ConnectionState, LedgerNodeClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use transport::{RpcTransport, StreamingTransport, Transport};
