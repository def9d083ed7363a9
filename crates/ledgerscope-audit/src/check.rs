use ledgerscope_crypto::LedgerHasher;
use ledgerscope_protocol::{LedgerParams, LedgerSummary};
use ledgerscope_store::{KeyValueEngine, LedgerHeaderEngine, LocalLedgerStore, StoreError};
use ledgerscope_types::{Digest, LedgerRecord, LedgerSeq};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{check_range, AuditResult};
use crate::source::LedgerSource;

/// A field on which the node and the local store disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub field: &'static str,
    pub remote: String,
    pub local: String,
}

impl Discrepancy {
    fn new(field: &'static str, remote: impl ToString, local: impl ToString) -> Self {
        Self {
            field,
            remote: remote.to_string(),
            local: local.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossCheckReport {
    pub seq: LedgerSeq,
    pub remote_found: bool,
    pub local_found: bool,
    /// Set when the local row exists but could not be read back intact.
    pub local_error: Option<String>,
    pub discrepancies: Vec<Discrepancy>,
}

impl CrossCheckReport {
    /// Both sides had the ledger and agreed on every compared field.
    pub fn is_consistent(&self) -> bool {
        self.remote_found && self.local_found && self.discrepancies.is_empty()
    }
}

/// Compares what a node reports with the local ledger database.
pub struct CrossCheck;

impl CrossCheck {
    /// Field-by-field comparison. Set hashes the node did not report are
    /// not compared.
    pub fn compare(remote: &LedgerSummary, local: &LedgerRecord) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        if remote.seq != local.seq {
            out.push(Discrepancy::new("seq", remote.seq, local.seq));
        }
        if remote.ledger_hash != local.hash {
            out.push(Discrepancy::new("ledger_hash", remote.ledger_hash, local.hash));
        }
        if remote.parent_hash != local.parent_hash {
            out.push(Discrepancy::new("parent_hash", remote.parent_hash, local.parent_hash));
        }
        compare_optional(&mut out, "account_hash", remote.account_hash, local.account_hash);
        compare_optional(&mut out, "transaction_hash", remote.transaction_hash, local.tx_hash);
        if let Some(coins) = remote.total_coins {
            if coins != local.total_coins {
                out.push(Discrepancy::new("total_coins", coins, local.total_coins));
            }
        }
        out
    }

    /// Fetch `seq` from the node and look it up locally. A corrupt local
    /// row is reported in `local_error` rather than returned as an error.
    pub fn ledger<S, H, K>(source: &mut S, store: &LocalLedgerStore<H, K>, seq: LedgerSeq) -> AuditResult<CrossCheckReport>
    where
        S: LedgerSource,
        H: LedgerHeaderEngine,
        K: KeyValueEngine,
    {
        let remote = source.fetch_ledger(LedgerParams::new(seq));
        let (local, local_error) = match store.lookup(seq) {
            Ok(local) => (local, None),
            Err(e) if is_bad_row(&e) => {
                warn!(seq, error = %e, "unreadable local ledger");
                (None, Some(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let discrepancies = match (&remote, &local) {
            (Some(r), Some(l)) => Self::compare(r, l),
            _ => Vec::new(),
        };
        if !discrepancies.is_empty() {
            warn!(seq, count = discrepancies.len(), "node disagrees with local ledger");
        }
        Ok(CrossCheckReport {
            seq,
            remote_found: remote.is_some(),
            local_found: local.is_some(),
            local_error,
            discrepancies,
        })
    }

    pub fn range<S, H, K>(
        source: &mut S,
        store: &LocalLedgerStore<H, K>,
        start: LedgerSeq,
        end: LedgerSeq,
    ) -> AuditResult<Vec<CrossCheckReport>>
    where
        S: LedgerSource,
        H: LedgerHeaderEngine,
        K: KeyValueEngine,
    {
        check_range(start, end)?;
        (start..=end).map(|seq| Self::ledger(&mut *source, store, seq)).collect()
    }
}

/// Errors confined to one stored ledger. A scan records these and moves on.
fn is_bad_row(err: &StoreError) -> bool {
    err.is_integrity_failure() || matches!(err, StoreError::Validation(_))
}

fn compare_optional(out: &mut Vec<Discrepancy>, field: &'static str, remote: Option<Digest>, local: Digest) {
    if let Some(remote) = remote {
        if remote != local {
            out.push(Discrepancy::new(field, remote, local));
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub start: LedgerSeq,
    pub end: LedgerSeq,
    pub ledgers_verified: u64,
    pub chain_valid: bool,
    pub violations: Vec<String>,
}

/// Checks that a local range of ledgers is complete, that every header
/// hashes to its key, and that each ledger links to its predecessor.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify `start..=end`. A missing or unreadable row becomes a
    /// violation and breaks the link check for the next sequence; only
    /// engine failures end the scan early.
    pub fn verify_range<H, K>(store: &LocalLedgerStore<H, K>, start: LedgerSeq, end: LedgerSeq) -> AuditResult<ChainReport>
    where
        H: LedgerHeaderEngine,
        K: KeyValueEngine,
    {
        check_range(start, end)?;
        let mut violations = Vec::new();
        let mut verified = 0u64;
        let mut prev: Option<LedgerRecord> = None;

        for seq in start..=end {
            let record = match store.lookup(seq) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    violations.push(format!("seq {seq}: missing"));
                    prev = None;
                    continue;
                }
                Err(e) if is_bad_row(&e) => {
                    violations.push(format!("seq {seq}: unreadable: {e}"));
                    prev = None;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if !LedgerHasher::verify(&record) {
                violations.push(format!("seq {seq}: header does not hash to {}", record.hash.short_hex()));
            }
            if let Some(p) = &prev {
                if record.parent_hash != p.hash {
                    violations.push(format!("seq {seq}: prev_hash mismatch"));
                }
            }
            verified += 1;
            prev = Some(record);
        }

        info!(start, end, verified, violations = violations.len(), "chain verified");
        Ok(ChainReport {
            start,
            end,
            ledgers_verified: verified,
            chain_valid: violations.is_empty(),
            violations,
        })
    }
}
