use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Length of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 32;

/// Canonical 32-byte content identifier.
///
/// A `Digest` keys ledger headers and node blobs, and doubles as the
/// integrity value a retrieved blob must hash back to. The all-zero value
/// is the "no value" sentinel.
///
/// Serializes as 64 uppercase hex characters, the form the ledger node uses
/// on the wire.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The zero digest.
    pub const fn zero() -> Self {
        Self([0u8; DIGEST_LEN])
    }

    /// Wrap an already fixed-size hash.
    pub const fn from_array(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a raw byte slice.
    ///
    /// An empty slice yields [`Digest::zero`]; any length other than 32
    /// is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.is_empty() {
            return Ok(Self::zero());
        }
        let arr: [u8; DIGEST_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parse from 64 hex characters (either case).
    ///
    /// An empty string yields [`Digest::zero`].
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Ok(Self::zero());
        }
        if s.len() != DIGEST_LEN * 2 {
            return Err(TypeError::InvalidLength {
                expected: DIGEST_LEN * 2,
                actual: s.len(),
            });
        }
        let mut arr = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut arr).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(arr))
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; DIGEST_LEN] {
        self.0
    }

    /// Uppercase hex, two digits per byte.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// First 8 hex characters, for logs.
    pub fn short_hex(&self) -> String {
        hex::encode_upper(&self.0[..4])
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = TypeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
