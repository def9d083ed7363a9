//! RocksDB-backed key-value engine for the node database.
//!
//! The node keeps one default column family mapping a 32-byte digest to an
//! encoded node. The database is opened read-only so a running node can
//! keep writing to it.

use std::path::Path;

use ledgerscope_types::Digest;
use rocksdb::{Options, DB};
use tracing::debug;

use crate::engine::KeyValueEngine;
use crate::error::{StoreError, StoreResult};

/// Read-only [`KeyValueEngine`] over a RocksDB node database.
pub struct RocksDbNodeEngine {
    db: DB,
}

impl RocksDbNodeEngine {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let opts = Options::default();
        let db = DB::open_for_read_only(&opts, path, false)
            .map_err(|e| StoreError::Backend(format!("open {}: {e}", path.display())))?;
        debug!(path = %path.display(), "opened node database");
        Ok(Self { db })
    }
}

impl KeyValueEngine for RocksDbNodeEngine {
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl std::fmt::Debug for RocksDbNodeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbNodeEngine")
            .field("path", &self.db.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeBlob, NodeKind};
    use tempfile::TempDir;

    #[test]
    fn reads_values_written_by_another_handle() {
        let tmp = TempDir::new().expect("create temp dir");
        let blob = NodeBlob::new(NodeKind::Ledger, b"header bytes".to_vec());
        let key = blob.compute_digest();
        {
            let mut opts = Options::default();
            opts.create_if_missing(true);
            let db = DB::open(&opts, tmp.path()).unwrap();
            db.put(key.as_bytes(), blob.encode()).unwrap();
        }

        let engine = RocksDbNodeEngine::open(tmp.path()).expect("open read-only");
        assert_eq!(engine.get(&key).unwrap(), Some(blob.encode()));
        assert!(engine.get(&Digest::zero()).unwrap().is_none());
    }
}
