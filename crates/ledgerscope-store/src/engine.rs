use ledgerscope_types::{Digest, LedgerRecord, LedgerSeq};

use crate::error::StoreResult;

/// Get-by-key contract of the engine backing the node store.
///
/// Implementations return the raw stored value, envelope included, and
/// never interpret it.
pub trait KeyValueEngine: Send + Sync {
    /// Read the value stored under `key`. Returns `Ok(None)` if absent.
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>>;
}

/// Get-by-hash / get-by-sequence contract of the engine backing the
/// ledger header index.
pub trait LedgerHeaderEngine: Send + Sync {
    /// Read the header keyed by `hash`. Returns `Ok(None)` if absent.
    fn by_hash(&self, hash: &Digest) -> StoreResult<Option<LedgerRecord>>;

    /// Read the header with sequence `seq`. Returns `Ok(None)` if absent.
    fn by_seq(&self, seq: LedgerSeq) -> StoreResult<Option<LedgerRecord>>;
}

impl<E: KeyValueEngine + ?Sized> KeyValueEngine for std::sync::Arc<E> {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }
}

impl<E: LedgerHeaderEngine + ?Sized> LedgerHeaderEngine for std::sync::Arc<E> {
    fn by_hash(&self, hash: &Digest) -> StoreResult<Option<LedgerRecord>> {
        (**self).by_hash(hash)
    }

    fn by_seq(&self, seq: LedgerSeq) -> StoreResult<Option<LedgerRecord>> {
        (**self).by_seq(seq)
    }
}
