use ledgerscope_crypto::LedgerHasher;
use ledgerscope_types::{Digest, LedgerId, LedgerRecord, LedgerSeq};
use tracing::warn;

use crate::cas::ContentAddressedStore;
use crate::engine::{KeyValueEngine, LedgerHeaderEngine};
use crate::error::StoreResult;
use crate::index::LedgerIndex;
use crate::node::NodeBlob;
use crate::sqlite::SqliteLedgerHeaders;

/// A node's local ledger state: header index plus node store.
///
/// Lets a caller cross-check ledger sequence, hash and parent hash without
/// a network round trip, and resolve a header's set hashes to nodes.
pub struct LocalLedgerStore<H, K> {
    index: LedgerIndex<H>,
    nodes: ContentAddressedStore<K>,
}

impl<K: KeyValueEngine> LocalLedgerStore<SqliteLedgerHeaders, K> {
    /// Open the SQLite ledger database at `ledger_db` and pair it with an
    /// already open node engine.
    pub fn with_ledger_db(ledger_db: impl AsRef<std::path::Path>, nodes: K) -> StoreResult<Self> {
        Ok(Self::new(SqliteLedgerHeaders::open(ledger_db)?, nodes))
    }
}

#[cfg(feature = "rocksdb")]
impl LocalLedgerStore<SqliteLedgerHeaders, crate::rocksdb::RocksDbNodeEngine> {
    /// Open both databases of a node data directory read-only.
    pub fn open(config: &crate::config::StoreConfig) -> StoreResult<Self> {
        let nodes = crate::rocksdb::RocksDbNodeEngine::open(config.node_db_path())?;
        Self::with_ledger_db(config.ledger_db_path(), nodes)
    }
}

impl<H: LedgerHeaderEngine, K: KeyValueEngine> LocalLedgerStore<H, K> {
    /// Combine a header engine and a node engine.
    pub fn new(headers: H, nodes: K) -> Self {
        Self {
            index: LedgerIndex::new(headers),
            nodes: ContentAddressedStore::new(nodes),
        }
    }

    /// The ledger header index.
    pub fn index(&self) -> &LedgerIndex<H> {
        &self.index
    }

    /// The verified node store.
    pub fn nodes(&self) -> &ContentAddressedStore<K> {
        &self.nodes
    }

    /// Look up a ledger header by sequence or hash. `Ok(None)` on a miss.
    pub fn lookup(&self, id: impl Into<LedgerId>) -> StoreResult<Option<LedgerRecord>> {
        self.index.lookup(id)
    }

    /// See [`LedgerIndex::hash_of`].
    pub fn hash_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<Digest>> {
        self.index.hash_of(id)
    }

    /// See [`LedgerIndex::parent_hash_of`].
    pub fn parent_hash_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<Digest>> {
        self.index.parent_hash_of(id)
    }

    /// See [`LedgerIndex::sequence_of`].
    pub fn sequence_of(&self, id: impl Into<LedgerId>) -> StoreResult<Option<LedgerSeq>> {
        self.index.sequence_of(id)
    }

    /// Fetch and verify a node. Accepts a header's set hashes directly.
    pub fn get(&self, key: &Digest) -> StoreResult<Option<NodeBlob>> {
        self.nodes.get(key)
    }

    /// Root node of the ledger's account-state tree.
    pub fn account_state_root(&self, id: impl Into<LedgerId>) -> StoreResult<Option<NodeBlob>> {
        self.resolve_set_root(id, |r| r.account_hash)
    }

    /// Root node of the ledger's transaction tree.
    pub fn transaction_root(&self, id: impl Into<LedgerId>) -> StoreResult<Option<NodeBlob>> {
        self.resolve_set_root(id, |r| r.tx_hash)
    }

    /// The ledger this one names as its parent.
    pub fn parent(&self, id: impl Into<LedgerId>) -> StoreResult<Option<LedgerRecord>> {
        match self.index.parent_hash_of(id)? {
            Some(parent) if !parent.is_zero() => self.index.lookup(parent),
            _ => Ok(None),
        }
    }

    /// Recompute the ledger hash from the header fields.
    ///
    /// Returns `Ok(None)` if the ledger is unknown, `Ok(Some(false))` if
    /// the stored fields do not hash to the stored key.
    pub fn verify_header(&self, id: impl Into<LedgerId>) -> StoreResult<Option<bool>> {
        let Some(record) = self.index.lookup(id)? else {
            return Ok(None);
        };
        let valid = LedgerHasher::verify(&record);
        if !valid {
            warn!(seq = record.seq, hash = %record.hash, "ledger header does not hash to its key");
        }
        Ok(Some(valid))
    }

    fn resolve_set_root(
        &self,
        id: impl Into<LedgerId>,
        field: impl Fn(&LedgerRecord) -> Digest,
    ) -> StoreResult<Option<NodeBlob>> {
        match self.index.lookup(id)? {
            Some(record) => {
                let key = field(&record);
                if key.is_zero() {
                    return Ok(None);
                }
                self.nodes.get(&key)
            }
            None => Ok(None),
        }
    }
}

impl<H, K> std::fmt::Debug for LocalLedgerStore<H, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLedgerStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::{InMemoryKeyValue, InMemoryLedgerHeaders};
    use crate::node::{NodeKind, NODE_HEADER_LEN};
    use crate::sqlite::tests::{insert, SCHEMA};
    use rusqlite::Connection;
    use tempfile::TempDir;

    struct Fixture {
        store: LocalLedgerStore<InMemoryLedgerHeaders, InMemoryKeyValue>,
        genesis: LedgerRecord,
        child: LedgerRecord,
    }

    fn header(seq: LedgerSeq, parent: Digest, account_hash: Digest, tx_hash: Digest) -> LedgerRecord {
        let mut record = LedgerRecord {
            hash: Digest::zero(),
            parent_hash: parent,
            seq,
            total_coins: 100_000_000_000_000_000,
            close_time: 1_000 + seq * 10,
            parent_close_time: 990 + seq * 10,
            close_time_resolution: 10,
            close_flags: 0,
            account_hash,
            tx_hash,
        };
        record.hash = LedgerHasher::header_hash(&record);
        record
    }

    fn fixture() -> Fixture {
        let kv = InMemoryKeyValue::new();
        let state = kv.insert_node(&NodeBlob::new(NodeKind::AccountNode, b"accounts".to_vec()));
        let txs = kv.insert_node(&NodeBlob::new(NodeKind::TransactionNode, b"txs".to_vec()));

        let genesis = header(1, Digest::zero(), state, Digest::zero());
        let child = header(2, genesis.hash, state, txs);

        let headers = InMemoryLedgerHeaders::new();
        headers.insert(genesis.clone());
        headers.insert(child.clone());

        Fixture {
            store: LocalLedgerStore::new(headers, kv),
            genesis,
            child,
        }
    }

    #[test]
    fn projections_agree_across_lookup_paths() {
        let f = fixture();
        let hash = f.store.hash_of(2u32).unwrap().unwrap();
        assert_eq!(hash, f.child.hash);
        assert_eq!(f.store.sequence_of(hash).unwrap(), Some(2));
        assert_eq!(f.store.parent_hash_of(hash).unwrap(), Some(f.genesis.hash));
    }

    #[test]
    fn set_hashes_resolve_through_get() {
        let f = fixture();
        let record = f.store.lookup(2u32).unwrap().unwrap();
        let root = f.store.get(&record.tx_hash).unwrap().unwrap();
        assert_eq!(root.kind, NodeKind::TransactionNode);
        assert_eq!(f.store.transaction_root(2u32).unwrap(), Some(root));

        let state = f.store.account_state_root(f.child.hash).unwrap().unwrap();
        assert_eq!(state.data, b"accounts");
    }

    #[test]
    fn zero_set_hash_has_no_root() {
        let f = fixture();
        assert!(f.store.transaction_root(1u32).unwrap().is_none());
    }

    #[test]
    fn parent_follows_hash_link() {
        let f = fixture();
        assert_eq!(f.store.parent(2u32).unwrap(), Some(f.genesis.clone()));
        assert!(f.store.parent(1u32).unwrap().is_none());
        assert!(f.store.parent(3u32).unwrap().is_none());
    }

    #[test]
    fn verify_header_detects_tampered_fields() {
        let f = fixture();
        assert_eq!(f.store.verify_header(2u32).unwrap(), Some(true));
        assert_eq!(f.store.verify_header(9u32).unwrap(), None);

        let mut forged = f.child.clone();
        forged.seq = 3;
        let headers = InMemoryLedgerHeaders::new();
        headers.insert(forged);
        let store = LocalLedgerStore::new(headers, InMemoryKeyValue::new());
        assert_eq!(store.verify_header(3u32).unwrap(), Some(false));
    }

    #[test]
    fn corrupted_root_surfaces_integrity_error() {
        let blob = NodeBlob::new(NodeKind::AccountNode, b"accounts".to_vec());
        let key = blob.compute_digest();
        let mut bytes = blob.encode();
        bytes[NODE_HEADER_LEN] ^= 0xFF;
        let kv = InMemoryKeyValue::new();
        kv.insert_raw(key, bytes);

        let headers = InMemoryLedgerHeaders::new();
        headers.insert(header(1, Digest::zero(), key, Digest::zero()));
        let store = LocalLedgerStore::new(headers, kv);

        let err = store.account_state_root(1u32).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[test]
    fn opens_sqlite_ledger_db() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("ledger.db");
        let f = fixture();
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(SCHEMA).unwrap();
            insert(&conn, &f.genesis);
            insert(&conn, &f.child);
        }

        let kv = InMemoryKeyValue::new();
        kv.insert_node(&NodeBlob::new(NodeKind::TransactionNode, b"txs".to_vec()));
        let store = LocalLedgerStore::with_ledger_db(&path, kv).unwrap();

        assert_eq!(store.lookup(f.child.hash).unwrap(), Some(f.child.clone()));
        assert_eq!(store.verify_header(2u32).unwrap(), Some(true));
        assert!(store.transaction_root(2u32).unwrap().is_some());
    }
}
