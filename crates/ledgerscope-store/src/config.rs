use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Location of a node's on-disk state.
///
/// Relative database paths are resolved against `data_dir`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// SQLite ledger header database.
    pub ledger_db: PathBuf,
    /// Key-value node database directory.
    pub node_db: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            ledger_db: PathBuf::from("ledger.db"),
            node_db: PathBuf::from("rocksdb"),
        }
    }
}

impl StoreConfig {
    /// Default database names under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Path of the SQLite ledger database.
    pub fn ledger_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_db)
    }

    /// Path of the node key-value database.
    pub fn node_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.node_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let c = StoreConfig::new("/var/lib/node/db");
        assert_eq!(c.ledger_db_path(), PathBuf::from("/var/lib/node/db/ledger.db"));
        assert_eq!(c.node_db_path(), PathBuf::from("/var/lib/node/db/rocksdb"));
    }

    #[test]
    fn absolute_paths_override_data_dir() {
        let c = StoreConfig {
            ledger_db: PathBuf::from("/elsewhere/ledger.db"),
            ..StoreConfig::new("/data")
        };
        assert_eq!(c.ledger_db_path(), PathBuf::from("/elsewhere/ledger.db"));
    }

    #[test]
    fn parses_partial_toml() {
        let c = StoreConfig::from_toml_str("data_dir = \"/srv/db\"\nnode_db = \"nudb\"").unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/srv/db"));
        assert_eq!(c.ledger_db, PathBuf::from("ledger.db"));
        assert_eq!(c.node_db_path(), PathBuf::from("/srv/db/nudb"));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            StoreConfig::from_toml_str("data_dir = 5"),
            Err(StoreError::Config(_))
        ));
    }
}
