//! Read-only adapter over the node's SQLite ledger database.
//!
//! Headers live in the `Ledgers` table:
//!
//! ```text
//! Ledgers(LedgerHash CHARACTER(64) PRIMARY KEY, LedgerSeq BIGINT UNSIGNED,
//!         PrevHash CHARACTER(64), TotalCoins BIGINT UNSIGNED,
//!         ClosingTime BIGINT UNSIGNED, PrevClosingTime BIGINT UNSIGNED,
//!         CloseTimeRes BIGINT UNSIGNED, CloseFlags BIGINT UNSIGNED,
//!         AccountSetHash CHARACTER(64), TransSetHash CHARACTER(64))
//! ```
//!
//! Hashes are stored as uppercase hex.

use std::path::Path;
use std::sync::Mutex;

use ledgerscope_types::{Digest, LedgerRecord, LedgerSeq};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use tracing::debug;

use crate::engine::LedgerHeaderEngine;
use crate::error::{StoreError, StoreResult};

const SELECT_COLUMNS: &str = "SELECT LedgerHash, PrevHash, LedgerSeq, TotalCoins, ClosingTime, \
     PrevClosingTime, CloseTimeRes, CloseFlags, AccountSetHash, TransSetHash FROM Ledgers";

/// A header row as SQLite hands it back, before validation.
struct RawHeaderRow {
    hash: Option<String>,
    parent_hash: Option<String>,
    seq: i64,
    total_coins: i64,
    close_time: i64,
    parent_close_time: i64,
    close_time_resolution: i64,
    close_flags: i64,
    account_hash: Option<String>,
    tx_hash: Option<String>,
}

impl RawHeaderRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get(0)?,
            parent_hash: row.get(1)?,
            seq: row.get(2)?,
            total_coins: row.get(3)?,
            close_time: row.get(4)?,
            parent_close_time: row.get(5)?,
            close_time_resolution: row.get(6)?,
            close_flags: row.get(7)?,
            account_hash: row.get(8)?,
            tx_hash: row.get(9)?,
        })
    }

    fn into_record(self) -> StoreResult<LedgerRecord> {
        Ok(LedgerRecord {
            hash: key_column(self.hash)?,
            parent_hash: hex_column("PrevHash", self.parent_hash)?,
            seq: int_column("LedgerSeq", self.seq)?,
            total_coins: int_column("TotalCoins", self.total_coins)?,
            close_time: int_column("ClosingTime", self.close_time)?,
            parent_close_time: int_column("PrevClosingTime", self.parent_close_time)?,
            close_time_resolution: int_column("CloseTimeRes", self.close_time_resolution)?,
            close_flags: int_column("CloseFlags", self.close_flags)?,
            account_hash: hex_column("AccountSetHash", self.account_hash)?,
            tx_hash: hex_column("TransSetHash", self.tx_hash)?,
        })
    }
}

/// `LedgerHash` keys the row and must hold a real hash.
fn key_column(value: Option<String>) -> StoreResult<Digest> {
    let hash = hex_column("LedgerHash", value)?;
    if hash.is_zero() {
        return Err(StoreError::MalformedHeader("LedgerHash is empty".into()));
    }
    Ok(hash)
}

/// NULL or empty reads as the zero hash (no parent, empty set).
fn hex_column(name: &str, value: Option<String>) -> StoreResult<Digest> {
    Digest::from_hex(value.as_deref().unwrap_or_default())
        .map_err(|e| StoreError::MalformedHeader(format!("{name}: {e}")))
}

fn int_column<T: TryFrom<i64>>(name: &str, value: i64) -> StoreResult<T> {
    T::try_from(value).map_err(|_| StoreError::MalformedHeader(format!("{name} out of range: {value}")))
}

/// [`LedgerHeaderEngine`] backed by the node's `ledger.db`.
pub struct SqliteLedgerHeaders {
    conn: Mutex<Connection>,
}

impl SqliteLedgerHeaders {
    /// Open an existing ledger database read-only.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.display(), "opened ledger database");
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn query_one(&self, clause: &str, key: impl rusqlite::ToSql) -> StoreResult<Option<LedgerRecord>> {
        let conn = self.conn.lock().expect("lock poisoned");
        let sql = format!("{SELECT_COLUMNS} WHERE {clause} LIMIT 1");
        let raw = conn
            .prepare_cached(&sql)?
            .query_row(params![key], RawHeaderRow::from_row)
            .optional()?;
        raw.map(RawHeaderRow::into_record).transpose()
    }
}

impl LedgerHeaderEngine for SqliteLedgerHeaders {
    fn by_hash(&self, hash: &Digest) -> StoreResult<Option<LedgerRecord>> {
        self.query_one("LedgerHash = ?1", hash.to_hex())
    }

    fn by_seq(&self, seq: LedgerSeq) -> StoreResult<Option<LedgerRecord>> {
        self.query_one("LedgerSeq = ?1", i64::from(seq))
    }
}

impl std::fmt::Debug for SqliteLedgerHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLedgerHeaders").finish_non_exhaustive()
    }
}
