use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use ledgerscope_types::{Digest, LedgerRecord, LedgerSeq};

use crate::engine::{KeyValueEngine, LedgerHeaderEngine};
use crate::error::StoreResult;
use crate::node::NodeBlob;

/// In-memory, HashMap-based key-value engine.
///
/// Intended for tests and embedding. Values are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryKeyValue {
    values: RwLock<HashMap<Digest, Vec<u8>>>,
}

impl InMemoryKeyValue {
    /// Create a new empty in-memory engine.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Store a raw value under an arbitrary key.
    pub fn insert_raw(&self, key: Digest, value: Vec<u8>) {
        self.values.write().expect("lock poisoned").insert(key, value);
    }

    /// Encode `blob` and store it under its own digest. Returns the key.
    pub fn insert_node(&self, blob: &NodeBlob) -> Digest {
        let key = blob.compute_digest();
        self.insert_raw(key, blob.encode());
        key
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the engine holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryKeyValue {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueEngine for InMemoryKeyValue {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }
}

impl std::fmt::Debug for InMemoryKeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyValue")
            .field("value_count", &self.len())
            .finish()
    }
}

#[derive(Default)]
struct HeaderTables {
    by_seq: BTreeMap<LedgerSeq, LedgerRecord>,
    seq_by_hash: HashMap<Digest, LedgerSeq>,
}

/// In-memory ledger header table with a unique sequence per hash.
#[derive(Default)]
pub struct InMemoryLedgerHeaders {
    tables: RwLock<HeaderTables>,
}

impl InMemoryLedgerHeaders {
    /// Create a new empty header table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header. A previous row with the same sequence is
    /// dropped from the hash index.
    pub fn insert(&self, record: LedgerRecord) {
        let mut tables = self.tables.write().expect("lock poisoned");
        if let Some(old) = tables.by_seq.remove(&record.seq) {
            tables.seq_by_hash.remove(&old.hash);
        }
        tables.seq_by_hash.insert(record.hash, record.seq);
        tables.by_seq.insert(record.seq, record);
    }

    /// Number of ledgers in the table.
    pub fn len(&self) -> usize {
        self.tables.read().expect("lock poisoned").by_seq.len()
    }

    /// Returns `true` if the table holds no ledgers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerHeaderEngine for InMemoryLedgerHeaders {
    fn by_hash(&self, hash: &Digest) -> StoreResult<Option<LedgerRecord>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables
            .seq_by_hash
            .get(hash)
            .and_then(|seq| tables.by_seq.get(seq))
            .cloned())
    }

    fn by_seq(&self, seq: LedgerSeq) -> StoreResult<Option<LedgerRecord>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.by_seq.get(&seq).cloned())
    }
}

impl std::fmt::Debug for InMemoryLedgerHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerHeaders")
            .field("ledger_count", &self.len())
            .finish()
    }
}
