use ledgerscope_crypto::sha512_half;
use ledgerscope_types::Digest;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Size of the envelope that precedes every stored node payload:
/// 8 reserved bytes followed by 1 type byte.
pub const NODE_HEADER_LEN: usize = 9;

/// The kind of object a node payload encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Unknown,
    /// Serialized ledger header.
    Ledger,
    /// Node of the account-state tree.
    AccountNode,
    /// Node of the transaction tree.
    TransactionNode,
}

impl NodeKind {
    /// Type byte as written by the node store.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Ledger => 1,
            Self::AccountNode => 3,
            Self::TransactionNode => 4,
        }
    }

    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Unknown),
            1 => Some(Self::Ledger),
            3 => Some(Self::AccountNode),
            4 => Some(Self::TransactionNode),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Ledger => write!(f, "ledger"),
            Self::AccountNode => write!(f, "account-node"),
            Self::TransactionNode => write!(f, "transaction-node"),
        }
    }
}

/// A node read from the content-addressed store.
///
/// `data` is opaque to this crate; only its digest is interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeBlob {
    pub kind: NodeKind,
    pub data: Vec<u8>,
}

impl NodeBlob {
    pub fn new(kind: NodeKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Content digest of the payload (the key the node is stored under).
    pub fn compute_digest(&self) -> Digest {
        sha512_half(&self.data)
    }

    /// Encode into the stored value layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(NODE_HEADER_LEN + self.data.len());
        buf.extend_from_slice(&[0u8; NODE_HEADER_LEN - 1]);
        buf.push(self.kind.type_byte());
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Decode a stored value read under `key`.
    ///
    /// Does not check the digest; see [`crate::ContentAddressedStore::get`].
    pub fn decode(key: &Digest, bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() < NODE_HEADER_LEN {
            return Err(StoreError::MalformedNode {
                key: *key,
                reason: format!("value is {} bytes, header needs {NODE_HEADER_LEN}", bytes.len()),
            });
        }
        let type_byte = bytes[NODE_HEADER_LEN - 1];
        let kind = NodeKind::from_type_byte(type_byte).ok_or_else(|| StoreError::MalformedNode {
            key: *key,
            reason: format!("unknown node type {type_byte}"),
        })?;
        Ok(Self {
            kind,
            data: bytes[NODE_HEADER_LEN..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bytes_roundtrip() {
        for kind in [
            NodeKind::Unknown,
            NodeKind::Ledger,
            NodeKind::AccountNode,
            NodeKind::TransactionNode,
        ] {
            assert_eq!(NodeKind::from_type_byte(kind.type_byte()), Some(kind));
        }
        assert_eq!(NodeKind::from_type_byte(2), None);
    }

    #[test]
    fn encode_layout() {
        let blob = NodeBlob::new(NodeKind::AccountNode, vec![0xAA, 0xBB]);
        let encoded = blob.encode();
        assert_eq!(encoded.len(), NODE_HEADER_LEN + 2);
        assert_eq!(&encoded[..8], &[0u8; 8]);
        assert_eq!(encoded[8], 3);
        assert_eq!(&encoded[9..], &[0xAA, 0xBB]);
        assert_eq!(NodeBlob::decode(&blob.compute_digest(), &encoded).unwrap(), blob);
    }

    #[test]
    fn decode_short_value_is_malformed() {
        let err = NodeBlob::decode(&Digest::zero(), &[0u8; 4]).unwrap_err();
        assert!(matches!(err, StoreError::MalformedNode { .. }));
    }

    #[test]
    fn decode_unknown_type_is_malformed() {
        let mut bytes = vec![0u8; NODE_HEADER_LEN];
        bytes[8] = 9;
        let err = NodeBlob::decode(&Digest::zero(), &bytes).unwrap_err();
        assert!(err.to_string().contains("unknown node type 9"));
    }

    #[test]
    fn digest_covers_payload_only() {
        let a = NodeBlob::new(NodeKind::Ledger, b"payload".to_vec());
        let b = NodeBlob::new(NodeKind::TransactionNode, b"payload".to_vec());
        assert_eq!(a.compute_digest(), b.compute_digest());
        assert_eq!(a.compute_digest(), sha512_half(b"payload"));
    }
}
