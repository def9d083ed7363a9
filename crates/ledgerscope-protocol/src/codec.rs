use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{CommandRequest, ReplyEnvelope};

/// Text codec for command envelopes.
pub struct CommandCodec;

impl CommandCodec {
    /// Serialize a request into the body sent over either transport.
    pub fn encode(request: &CommandRequest) -> ProtocolResult<String> {
        serde_json::to_string(request).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Parse a reply body. Anything but a JSON object is rejected.
    pub fn decode(body: &str) -> ProtocolResult<ReplyEnvelope> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        ReplyEnvelope::from_value(value)
    }
}
