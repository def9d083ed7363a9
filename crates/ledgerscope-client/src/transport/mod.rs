//! The two ways a command reaches the node.

mod rpc;
mod ws;

use std::net::IpAddr;
use std::time::Duration;

use ledgerscope_protocol::{ConnectionDescriptor, TransportKind};

use crate::config::ClientConfig;
use crate::error::ClientResult;

pub use rpc::RpcTransport;
pub use ws::StreamingTransport;

/// A channel that carries serialized command envelopes to a node and
/// replies back.
///
/// Calls are blocking and bounded by the timeout the transport was built
/// with. `close` on a closed or never opened transport is a no-op.
pub trait Transport: Send {
    fn kind(&self) -> TransportKind;

    /// Open the channel. Returns the peer address when it is known at this
    /// point.
    fn connect(&mut self) -> ClientResult<Option<IpAddr>>;

    fn send(&mut self, message: &str) -> ClientResult<()>;

    /// Next text message from the node, waiting at most `wait`.
    fn receive(&mut self, wait: Duration) -> ClientResult<String>;

    fn close(&mut self) -> ClientResult<()>;

    fn is_open(&self) -> bool;

    /// Address of the node as last observed.
    fn remote_ip(&self) -> Option<IpAddr> {
        None
    }
}

/// Build the transport the descriptor's scheme calls for.
pub fn for_descriptor(descriptor: &ConnectionDescriptor, config: &ClientConfig) -> Box<dyn Transport> {
    match descriptor.kind() {
        TransportKind::Rpc => Box::new(RpcTransport::new(descriptor.url().clone(), config.timeout())),
        TransportKind::Streaming => Box::new(StreamingTransport::new(
            descriptor.url().clone(),
            config.timeout(),
            config.no_ssl_verify,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_selects_transport() {
        let config = ClientConfig::default();
        for (s, kind) in [
            ("http://h:5005", TransportKind::Rpc),
            ("https://h", TransportKind::Rpc),
            ("ws://h:6006", TransportKind::Streaming),
            ("wss://h", TransportKind::Streaming),
        ] {
            let d = ConnectionDescriptor::parse(s).unwrap();
            let t = for_descriptor(&d, &config);
            assert_eq!(t.kind(), kind);
            assert!(!t.is_open());
        }
    }
}
