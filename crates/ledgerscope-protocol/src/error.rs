use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid connection descriptor {descriptor:?}: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    #[error("unsupported scheme {0:?}: expected http, https, ws or wss")]
    UnsupportedScheme(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("reply is not a JSON object")]
    NotAnObject,
}

impl ProtocolError {
    /// Returns `true` for errors raised while validating configuration,
    /// as opposed to errors in a single exchange.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidDescriptor { .. } | Self::UnsupportedScheme(_))
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
