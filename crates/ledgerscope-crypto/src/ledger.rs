use ledgerscope_types::{Digest, LedgerRecord};

use crate::hasher::NodeHasher;

/// Four-byte tag prepended to hashed objects so different object types
/// never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashPrefix(u32);

impl HashPrefix {
    /// Ledger header (`LWR\0`).
    pub const LEDGER_MASTER: Self = Self(u32::from_be_bytes(*b"LWR\0"));

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// Recomputes ledger hashes from header fields.
pub struct LedgerHasher;

impl LedgerHasher {
    /// Hash of a ledger header as the node computes it.
    ///
    /// Field order and widths are fixed by the network: seq, total coins,
    /// parent hash, transaction-set hash, account-set hash, parent close
    /// time, close time, close time resolution, close flags.
    pub fn header_hash(record: &LedgerRecord) -> Digest {
        let mut hasher = NodeHasher::new();
        hasher
            .update(&HashPrefix::LEDGER_MASTER.to_be_bytes())
            .update(&record.seq.to_be_bytes())
            .update(&record.total_coins.to_be_bytes())
            .update(record.parent_hash.as_bytes())
            .update(record.tx_hash.as_bytes())
            .update(record.account_hash.as_bytes())
            .update(&record.parent_close_time.to_be_bytes())
            .update(&record.close_time.to_be_bytes())
            .update(&[record.close_time_resolution, record.close_flags]);
        hasher.finalize()
    }

    /// Returns `true` if the record's fields hash to its own `hash`.
    pub fn verify(record: &LedgerRecord) -> bool {
        Self::header_hash(record) == record.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sha512_half;

    fn record() -> LedgerRecord {
        LedgerRecord {
            hash: Digest::zero(),
            parent_hash: Digest::from_array([1; 32]),
            seq: 42,
            total_coins: 100_000_000_000_000_000,
            close_time: 500,
            parent_close_time: 490,
            close_time_resolution: 30,
            close_flags: 0,
            account_hash: Digest::from_array([2; 32]),
            tx_hash: Digest::from_array([3; 32]),
        }
    }

    #[test]
    fn prefix_spells_lwr() {
        assert_eq!(HashPrefix::LEDGER_MASTER.to_be_bytes(), *b"LWR\0");
    }

    #[test]
    fn header_hash_matches_flat_serialization() {
        let r = record();
        let mut flat = Vec::new();
        flat.extend_from_slice(b"LWR\0");
        flat.extend_from_slice(&42u32.to_be_bytes());
        flat.extend_from_slice(&100_000_000_000_000_000u64.to_be_bytes());
        flat.extend_from_slice(&[1; 32]);
        flat.extend_from_slice(&[3; 32]);
        flat.extend_from_slice(&[2; 32]);
        flat.extend_from_slice(&490u32.to_be_bytes());
        flat.extend_from_slice(&500u32.to_be_bytes());
        flat.extend_from_slice(&[30, 0]);
        assert_eq!(flat.len(), 118);
        assert_eq!(LedgerHasher::header_hash(&r), sha512_half(&flat));
    }

    #[test]
    fn verify_accepts_consistent_record() {
        let mut r = record();
        r.hash = LedgerHasher::header_hash(&r);
        assert!(LedgerHasher::verify(&r));

        r.close_flags = 1;
        assert!(!LedgerHasher::verify(&r));
    }
}
