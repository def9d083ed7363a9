use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digest::{Digest, DIGEST_LEN};
use crate::error::TypeError;

/// Ledger sequence number.
pub type LedgerSeq = u32;

/// A ledger addressed either by sequence number or by hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerId {
    Sequence(LedgerSeq),
    Hash(Digest),
}

impl LedgerId {
    pub fn as_sequence(&self) -> Option<LedgerSeq> {
        match self {
            Self::Sequence(seq) => Some(*seq),
            Self::Hash(_) => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Digest> {
        match self {
            Self::Sequence(_) => None,
            Self::Hash(hash) => Some(hash),
        }
    }
}

impl FromStr for LedgerId {
    type Err = TypeError;

    /// Decimal digits parse as a sequence; 64 hex characters parse as a hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == DIGEST_LEN * 2 {
            return Digest::from_hex(s).map(Self::Hash);
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<LedgerSeq>()
                .map(Self::Sequence)
                .map_err(|_| TypeError::InvalidLedgerId(s.to_string()));
        }
        Err(TypeError::InvalidLedgerId(s.to_string()))
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(seq) => write!(f, "{seq}"),
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

impl From<LedgerSeq> for LedgerId {
    fn from(seq: LedgerSeq) -> Self {
        Self::Sequence(seq)
    }
}

impl From<Digest> for LedgerId {
    fn from(hash: Digest) -> Self {
        Self::Hash(hash)
    }
}

/// Immutable snapshot of one ledger header.
///
/// `parent_hash` is the key of the preceding ledger, so records form a
/// hash-linked chain. `account_hash` and `tx_hash` are the root keys of the
/// account-state and transaction trees in the node store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub hash: Digest,
    pub parent_hash: Digest,
    pub seq: LedgerSeq,
    /// Total coins in existence, in drops.
    pub total_coins: u64,
    /// Close time in seconds since the network epoch.
    pub close_time: u32,
    pub parent_close_time: u32,
    /// Close time resolution in seconds.
    pub close_time_resolution: u8,
    pub close_flags: u8,
    pub account_hash: Digest,
    pub tx_hash: Digest,
}

impl LedgerRecord {
    /// Returns `true` if this record claims `other` as its parent.
    pub fn follows(&self, other: &LedgerRecord) -> bool {
        self.parent_hash == other.hash && other.seq.checked_add(1) == Some(self.seq)
    }
}
