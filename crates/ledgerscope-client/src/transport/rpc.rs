use std::net::IpAddr;
use std::time::Duration;

use ledgerscope_protocol::TransportKind;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// JSON-RPC over HTTP: every command is its own POST.
///
/// There is no persistent channel. `connect` only builds the HTTP client,
/// and the node is first contacted by `send`. The reply body is held until
/// `receive` takes it.
pub struct RpcTransport {
    url: Url,
    timeout: Duration,
    client: Option<Client>,
    pending: Option<String>,
    remote_ip: Option<IpAddr>,
}

impl RpcTransport {
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            timeout,
            client: None,
            pending: None,
            remote_ip: None,
        }
    }

    fn map_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl Transport for RpcTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rpc
    }

    fn connect(&mut self) -> ClientResult<Option<IpAddr>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        self.client = Some(client);
        self.pending = None;
        Ok(None)
    }

    fn send(&mut self, message: &str) -> ClientResult<()> {
        let client = self.client.as_ref().ok_or(ClientError::NotConnected)?;
        let response = client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(message.to_owned())
            .send()
            .map_err(|e| self.map_error(e))?;

        if let Some(addr) = response.remote_addr() {
            self.remote_ip = Some(addr.ip());
        }
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("HTTP {status}")));
        }
        let body = response.text().map_err(|e| self.map_error(e))?;
        debug!(url = %self.url, bytes = body.len(), "rpc reply");
        self.pending = Some(body);
        Ok(())
    }

    /// The reply was read in full by `send`, so there is nothing to wait for.
    fn receive(&mut self, _wait: Duration) -> ClientResult<String> {
        self.pending
            .take()
            .ok_or_else(|| ClientError::Transport("no reply pending".into()))
    }

    fn close(&mut self) -> ClientResult<()> {
        self.client = None;
        self.pending = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("url", &self.url.as_str())
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
