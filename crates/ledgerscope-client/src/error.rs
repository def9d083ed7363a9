use std::time::Duration;

use ledgerscope_protocol::ProtocolError;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Timeout,
    Protocol,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("transport is not connected")]
    NotConnected,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Config(_) => ErrorKind::Validation,
            Self::Protocol(e) if e.is_validation() => ErrorKind::Validation,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Transport(_) | Self::NotConnected | Self::Io(_) => ErrorKind::Transport,
        }
    }

    /// Returns `true` if the channel can no longer be trusted and must be
    /// torn down.
    pub fn breaks_connection(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Timeout)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(ClientError::Timeout(Duration::from_secs(1)).kind(), ErrorKind::Timeout);
        assert_eq!(ClientError::NotConnected.kind(), ErrorKind::Transport);
        assert_eq!(
            ClientError::from(ProtocolError::NotAnObject).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            ClientError::from(ProtocolError::UnsupportedScheme("ftp".into())).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn protocol_errors_keep_connection() {
        assert!(!ClientError::from(ProtocolError::NotAnObject).breaks_connection());
        assert!(ClientError::Transport("reset".into()).breaks_connection());
        assert!(ClientError::Timeout(Duration::from_millis(5)).breaks_connection());
    }
}
