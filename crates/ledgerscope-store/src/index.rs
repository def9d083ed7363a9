use std::str::FromStr;

use ledgerscope_types::{Digest, LedgerId, LedgerRecord, LedgerSeq};

use crate::engine::LedgerHeaderEngine;
use crate::error::StoreResult;

/// Resolves ledger identifiers to header records.
pub struct LedgerIndex<E> {
    engine: E,
}

impl<E: LedgerHeaderEngine> LedgerIndex<E> {
    /// Create an index over a header engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Look up a ledger by sequence or hash. Returns `Ok(None)` on a miss.
    pub fn lookup(&self, id: impl Into<LedgerId>) -> StoreResult<Option<LedgerRecord>> {
        match id.into() {
            LedgerId::Sequence(seq) => self.engine.by_seq(seq),
            LedgerId::Hash(hash) => self.engine.by_hash(&hash),
        }
    }

    /// Look up a ledger from its textual identifier (decimal sequence or
    /// 64-character hex hash). Any other text is a validation error.
    pub fn lookup_str(&self, id: &str) -> StoreResult<Option<LedgerRecord>> {
        let id = LedgerId::from_str(id)?;
        self.lookup(id)
    }

    /// Hash of the ledger `id` resolves to.
    pub fn hash_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<Digest>> {
        Ok(self.lookup(id)?.map(|r| r.hash))
    }

    /// Parent hash of the ledger `id` resolves to. Zero for genesis.
    pub fn parent_hash_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<Digest>> {
        Ok(self.lookup(id)?.map(|r| r.parent_hash))
    }

    /// Sequence number of the ledger `id` resolves to.
    pub fn sequence_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<LedgerSeq>> {
        Ok(self.lookup(id)?.map(|r| r.seq))
    }

    /// The underlying header engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E> std::fmt::Debug for LedgerIndex<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerIndex").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::InMemoryLedgerHeaders;

    fn record(seq: LedgerSeq) -> LedgerRecord {
        LedgerRecord {
            hash: Digest::from_array([seq as u8; 32]),
            parent_hash: Digest::from_array([(seq - 1) as u8; 32]),
            seq,
            total_coins: 1_000,
            close_time: seq * 10,
            parent_close_time: (seq - 1) * 10,
            close_time_resolution: 10,
            close_flags: 0,
            account_hash: Digest::from_array([0xA0; 32]),
            tx_hash: Digest::from_array([0xB0; 32]),
        }
    }

    fn index() -> LedgerIndex<InMemoryLedgerHeaders> {
        let headers = InMemoryLedgerHeaders::new();
        for seq in 10u32..=12 {
            headers.insert(record(seq));
        }
        LedgerIndex::new(headers)
    }

    #[test]
    fn sequence_and_hash_paths_agree() {
        let index = index();
        for seq in 10u32..=12 {
            let hash = index.hash_of(seq).unwrap().unwrap();
            assert_eq!(index.sequence_of(hash).unwrap(), Some(seq));
            assert_eq!(index.lookup(seq).unwrap(), index.lookup(hash).unwrap());
        }
    }

    #[test]
    fn parent_hash_links_to_previous_ledger() {
        let index = index();
        let parent = index.parent_hash_of(11u32).unwrap().unwrap();
        assert_eq!(index.hash_of(10u32).unwrap(), Some(parent));
    }

    #[test]
    fn misses_are_absent() {
        let index = index();
        assert!(index.lookup(99u32).unwrap().is_none());
        assert!(index.lookup(Digest::from_array([0xEE; 32])).unwrap().is_none());
        assert!(index.hash_of(99u32).unwrap().is_none());
        assert!(index.parent_hash_of(99u32).unwrap().is_none());
        assert!(index.sequence_of(Digest::zero()).unwrap().is_none());
    }

    #[test]
    fn lookup_str_accepts_sequence_and_hex() {
        let index = index();
        let by_seq = index.lookup_str("11").unwrap().unwrap();
        let by_hex = index.lookup_str(&by_seq.hash.to_hex().to_lowercase()).unwrap();
        assert_eq!(by_hex, Some(by_seq));
    }

    #[test]
    fn lookup_str_rejects_garbage() {
        let err = index().lookup_str("closed").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
