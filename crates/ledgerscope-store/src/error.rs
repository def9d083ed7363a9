use ledgerscope_types::{Digest, TypeError};

/// Errors from local store operations.
///
/// A missing key is not an error: lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Retrieved payload does not hash to the key it was stored under.
    #[error("hash mismatch for {key}: computed {computed}")]
    HashMismatch { key: Digest, computed: Digest },

    /// Stored value cannot be decoded as a node.
    #[error("malformed node {key}: {reason}")]
    MalformedNode { key: Digest, reason: String },

    /// A header row holds a value that does not fit its field.
    #[error("malformed ledger header: {0}")]
    MalformedHeader(String),

    #[error("validation error: {0}")]
    Validation(#[from] TypeError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure reported by a key-value engine.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for failures that mean the stored data itself is bad.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::HashMismatch { .. } | Self::MalformedNode { .. } | Self::MalformedHeader(_)
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
