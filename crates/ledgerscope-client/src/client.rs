use std::net::IpAddr;
use std::time::{Duration, Instant};

use ledgerscope_protocol::{
    methods, CommandCodec, CommandRequest, ConnectionDescriptor, LedgerParams, LedgerSelector,
    LedgerSummary, ReplyEnvelope, TransportKind,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::activity::ActivityLog;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{self, Transport};

/// Lifecycle of the client's one logical connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A client bound to one ledger node.
///
/// Owns its transport exclusively and runs one command at a time; `&mut
/// self` on every network operation enforces that. Reconnecting always
/// releases the previous channel before opening a new one.
pub struct LedgerNodeClient {
    descriptor: ConnectionDescriptor,
    timeout: Duration,
    transport: Box<dyn Transport>,
    state: ConnectionState,
    log: ActivityLog,
    next_id: u64,
}

impl LedgerNodeClient {
    /// Build a client from configuration.
    ///
    /// Fails only if the connection string is malformed or names an
    /// unsupported scheme. No network activity happens here.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let descriptor = parse_descriptor(&config.connection)?;
        let transport = transport::for_descriptor(&descriptor, &config);
        Ok(Self::assemble(descriptor, &config, transport))
    }

    /// Shorthand for [`LedgerNodeClient::new`] with default settings.
    pub fn for_connection(connection: &str) -> ClientResult<Self> {
        Self::new(ClientConfig::new(connection))
    }

    /// Build a client over a caller-supplied transport. Its kind must
    /// match the connection string's scheme.
    pub fn with_transport(config: ClientConfig, transport: Box<dyn Transport>) -> ClientResult<Self> {
        let descriptor = parse_descriptor(&config.connection)?;
        if transport.kind() != descriptor.kind() {
            return Err(ClientError::Validation(format!(
                "{} transport cannot serve {}",
                transport.kind(),
                descriptor
            )));
        }
        Ok(Self::assemble(descriptor, &config, transport))
    }

    fn assemble(descriptor: ConnectionDescriptor, config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            log: ActivityLog::new(config.connection.clone()),
            timeout: config.timeout(),
            descriptor,
            transport,
            state: ConnectionState::Disconnected,
            next_id: 1,
        }
    }

    /// The parsed connection string.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.descriptor.kind()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// What the client did last, and the error if it failed.
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Node address as last observed by the transport.
    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.log.remote_ip
    }

    /// Open the connection, replacing any existing one.
    ///
    /// Returns `true` on success. Failures land in the activity log.
    pub fn connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            self.disconnect();
        }
        self.state = ConnectionState::Connecting;
        self.log.begin("connect");

        match self.transport.connect() {
            Ok(peer) => {
                if peer.is_some() {
                    self.log.remote_ip = peer;
                }
                self.log.mark_connected();
                self.state = ConnectionState::Connected;
                info!(connection = %self.descriptor, kind = %self.descriptor.kind(), "connected");
                true
            }
            Err(e) => {
                warn!(connection = %self.descriptor, error = %e, "connect failed");
                self.log.record_error(&e);
                self.log.mark_disconnected();
                self.state = ConnectionState::Disconnected;
                false
            }
        }
    }

    /// Release the connection. Safe to call in any state.
    pub fn disconnect(&mut self) {
        self.log.begin("disconnect");
        if let Err(e) = self.transport.close() {
            debug!(error = %e, "error while closing transport");
            self.log.record_error(&e);
        }
        self.log.mark_disconnected();
        self.state = ConnectionState::Disconnected;
    }

    /// Send one command and wait for its reply.
    ///
    /// Connects first if needed. Returns `None` on any transport, timeout
    /// or decoding failure; the cause is in [`LedgerNodeClient::log`].
    pub fn command(&mut self, method: &str, params: Option<Vec<Value>>, id: Option<Value>) -> Option<ReplyEnvelope> {
        let request = CommandRequest {
            method: method.to_string(),
            id,
            params,
        };
        self.execute(method.to_string(), request)
    }

    /// Run `server_info`.
    pub fn server_info(&mut self) -> Option<ReplyEnvelope> {
        self.command(methods::SERVER_INFO, None, None)
    }

    /// Request a ledger header only.
    pub fn ledger(&mut self, ledger: impl Into<LedgerSelector>) -> Option<ReplyEnvelope> {
        self.ledger_with(LedgerParams::new(ledger))
    }

    /// Request a ledger with explicit flags. The activity label names the
    /// requested ledger, e.g. `ledger 5` or `ledger validated`.
    pub fn ledger_with(&mut self, params: LedgerParams) -> Option<ReplyEnvelope> {
        let activity = format!("{} {}", methods::LEDGER, params.ledger);
        let value = match params.to_value() {
            Ok(v) => v,
            Err(e) => {
                let e = ClientError::from(e);
                self.log.begin(activity);
                self.log.record_error(&e);
                return None;
            }
        };
        let request = CommandRequest::new(methods::LEDGER).with_params(vec![value]);
        self.execute(activity, request)
    }

    /// Fetch and decode a ledger.
    ///
    /// `None` when the command failed, the node reported an error, or the
    /// reply did not decode.
    pub fn fetch_ledger(&mut self, params: LedgerParams) -> Option<LedgerSummary> {
        let reply = self.ledger_with(params)?;
        match reply.ledger() {
            Ok(Some(ledger)) => Some(ledger),
            Ok(None) => {
                debug!(status = ?reply.status(), error = ?reply.error(), "no ledger in reply");
                None
            }
            Err(e) => {
                warn!(error = %e, "undecodable ledger in reply");
                self.log.record_error(&ClientError::from(e));
                None
            }
        }
    }

    fn execute(&mut self, activity: String, mut request: CommandRequest) -> Option<ReplyEnvelope> {
        if self.state != ConnectionState::Connected && !self.connect() {
            self.log.activity = activity;
            return None;
        }
        if request.id.is_none() && self.transport.kind() == TransportKind::Streaming {
            request.id = Some(Value::from(self.next_id));
            self.next_id += 1;
        }

        self.log.begin(activity);
        self.log.mark_connected();
        let outcome = self.exchange(&request);
        self.log.mark_disconnected();
        if let Some(ip) = self.transport.remote_ip() {
            self.log.remote_ip = Some(ip);
        }

        match outcome {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(method = %request.method, error = %e, "command failed");
                self.log.record_error(&e);
                if e.breaks_connection() {
                    if let Err(close_err) = self.transport.close() {
                        debug!(error = %close_err, "error while closing transport");
                    }
                    self.state = ConnectionState::Disconnected;
                }
                None
            }
        }
    }

    fn exchange(&mut self, request: &CommandRequest) -> ClientResult<ReplyEnvelope> {
        let body = CommandCodec::encode(request)?;
        let deadline = Instant::now() + self.timeout;
        self.transport.send(&body)?;

        let correlate = self.transport.kind() == TransportKind::Streaming && request.id.is_some();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClientError::Timeout(self.timeout));
            }
            let text = self.transport.receive(remaining)?;
            let reply = CommandCodec::decode(&text)?;
            if !correlate || reply.id() == request.id.as_ref() {
                return Ok(reply);
            }
            debug!(expected = ?request.id, got = ?reply.id(), "skipping unrelated message");
        }
    }
}

fn parse_descriptor(connection: &str) -> ClientResult<ConnectionDescriptor> {
    ConnectionDescriptor::parse(connection).map_err(|e| ClientError::Validation(e.to_string()))
}

impl Drop for LedgerNodeClient {
    fn drop(&mut self) {
        if self.transport.is_open() {
            if let Err(e) = self.transport.close() {
                debug!(error = %e, "error while closing transport on drop");
            }
        }
    }
}

impl std::fmt::Debug for LedgerNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerNodeClient")
            .field("connection", &self.descriptor.as_str())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
