use std::fmt;

use url::Url;

use crate::error::{ProtocolError, ProtocolResult};

/// How commands reach the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// One HTTP request per command (`http`, `https`).
    Rpc,
    /// Persistent WebSocket connection (`ws`, `wss`).
    Streaming,
}

impl TransportKind {
    /// Classify a URL scheme. Unknown schemes yield `None`.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "http" | "https" => Some(Self::Rpc),
            "ws" | "wss" => Some(Self::Streaming),
            _ => None,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc => write!(f, "rpc"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

/// A parsed connection string.
///
/// The transport kind is fixed here, once; a scheme outside the two
/// recognized families never produces a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    url: Url,
    kind: TransportKind,
}

impl ConnectionDescriptor {
    pub fn parse(s: &str) -> ProtocolResult<Self> {
        let url = Url::parse(s).map_err(|e| ProtocolError::InvalidDescriptor {
            descriptor: s.to_string(),
            reason: e.to_string(),
        })?;
        let kind = TransportKind::from_scheme(url.scheme())
            .ok_or_else(|| ProtocolError::UnsupportedScheme(url.scheme().to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ProtocolError::InvalidDescriptor {
                descriptor: s.to_string(),
                reason: "missing host".into(),
            });
        }
        Ok(Self { url, kind })
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, or the scheme default (80/443).
    pub fn port(&self) -> u16 {
        self.url
            .port_or_known_default()
            .unwrap_or(if self.is_secure() { 443 } else { 80 })
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns `true` for `https` and `wss`.
    pub fn is_secure(&self) -> bool {
        matches!(self.url.scheme(), "https" | "wss")
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl std::str::FromStr for ConnectionDescriptor {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_family_is_rpc() {
        for s in ["http://host", "https://host"] {
            assert_eq!(ConnectionDescriptor::parse(s).unwrap().kind(), TransportKind::Rpc);
        }
    }

    #[test]
    fn ws_family_is_streaming() {
        for s in ["ws://host", "wss://host"] {
            assert_eq!(
                ConnectionDescriptor::parse(s).unwrap().kind(),
                TransportKind::Streaming
            );
        }
    }

    #[test]
    fn other_schemes_rejected() {
        let err = ConnectionDescriptor::parse("ftp://host").unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedScheme(ref s) if s == "ftp"));
        assert!(err.is_validation());
    }

    #[test]
    fn garbage_rejected() {
        let err = ConnectionDescriptor::parse("not a url").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidDescriptor { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn components_exposed() {
        let d = ConnectionDescriptor::parse("wss://s1.example.net:51233/ws").unwrap();
        assert_eq!(d.scheme(), "wss");
        assert_eq!(d.host(), "s1.example.net");
        assert_eq!(d.port(), 51233);
        assert_eq!(d.path(), "/ws");
        assert!(d.is_secure());
    }

    #[test]
    fn default_ports() {
        assert_eq!(ConnectionDescriptor::parse("http://h").unwrap().port(), 80);
        assert_eq!(ConnectionDescriptor::parse("wss://h").unwrap().port(), 443);
        assert_eq!(ConnectionDescriptor::parse("ws://h").unwrap().port(), 80);
    }
}
