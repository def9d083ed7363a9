use ledgerscope_store::StoreError;
use ledgerscope_types::LedgerSeq;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: LedgerSeq, end: LedgerSeq },

    #[error("sink rejected ledger {seq}: {reason}")]
    Sink { seq: LedgerSeq, reason: String },

    #[error("local store error: {0}")]
    Store(#[from] StoreError),
}

pub type AuditResult<T> = Result<T, AuditError>;

pub(crate) fn check_range(start: LedgerSeq, end: LedgerSeq) -> AuditResult<()> {
    if start > end {
        return Err(AuditError::InvalidRange { start, end });
    }
    Ok(())
}
