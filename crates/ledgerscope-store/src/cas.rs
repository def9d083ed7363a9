use ledgerscope_types::Digest;
use tracing::warn;

use crate::engine::KeyValueEngine;
use crate::error::{StoreError, StoreResult};
use crate::node::NodeBlob;

/// Resolves digests to node blobs, verifying every read.
///
/// The payload of each retrieved node is rehashed with SHA-512-half and
/// compared with the requested key. There is no way to skip the check.
pub struct ContentAddressedStore<E> {
    engine: E,
}

impl<E: KeyValueEngine> ContentAddressedStore<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Fetch and verify the node stored under `key`.
    ///
    /// Returns `Ok(None)` if the engine has no entry, and
    /// [`StoreError::HashMismatch`] if the payload does not hash to `key`.
    pub fn get(&self, key: &Digest) -> StoreResult<Option<NodeBlob>> {
        let Some(bytes) = self.engine.get(key)? else {
            return Ok(None);
        };
        let blob = NodeBlob::decode(key, &bytes)?;
        let computed = blob.compute_digest();
        if computed != *key {
            warn!(key = %key, computed = %computed, "node failed integrity check");
            return Err(StoreError::HashMismatch { key: *key, computed });
        }
        Ok(Some(blob))
    }

    /// Returns `true` if a verified node exists under `key`.
    pub fn contains(&self, key: &Digest) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E> std::fmt::Debug for ContentAddressedStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAddressedStore").finish_non_exhaustive()
    }
}
