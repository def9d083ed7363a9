use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings a [`LedgerNodeClient`](crate::LedgerNodeClient) is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection string, e.g. `wss://s1.example.net:51233`.
    pub connection: String,
    /// Bound on connection establishment and on each command round trip.
    pub timeout_secs: u64,
    /// Skip certificate and hostname checks on `wss` handshakes.
    pub no_ssl_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: "ws://127.0.0.1:6006".into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            no_ssl_verify: false,
        }
    }
}

impl ClientConfig {
    /// Default settings for the given connection string.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            ..Self::default()
        }
    }

    /// Set the timeout, in whole seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Skip certificate verification on `wss` connections.
    pub fn with_no_ssl_verify(mut self, no_ssl_verify: bool) -> Self {
        self.no_ssl_verify = no_ssl_verify;
        self
    }

    /// The configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
