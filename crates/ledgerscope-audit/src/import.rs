use ledgerscope_protocol::{LedgerParams, LedgerSummary, TransactionRecord};
use ledgerscope_types::LedgerSeq;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{check_range, AuditResult};
use crate::source::LedgerSource;

/// Destination for imported ledgers, e.g. a SQL warehouse.
pub trait LedgerSink {
    fn insert_ledger(&mut self, ledger: &LedgerSummary) -> AuditResult<()>;

    fn insert_transaction(&mut self, ledger: &LedgerSummary, tx: &TransactionRecord) -> AuditResult<()>;
}

/// Keeps everything it is given. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ledgers: Vec<LedgerSummary>,
    pub transactions: Vec<(LedgerSeq, TransactionRecord)>,
}

impl LedgerSink for RecordingSink {
    fn insert_ledger(&mut self, ledger: &LedgerSummary) -> AuditResult<()> {
        self.ledgers.push(ledger.clone());
        Ok(())
    }

    fn insert_transaction(&mut self, ledger: &LedgerSummary, tx: &TransactionRecord) -> AuditResult<()> {
        self.transactions.push((ledger.seq, tx.clone()));
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub ledgers_imported: u64,
    pub transactions_imported: u64,
    /// Sequences the node had no usable ledger for.
    pub skipped: Vec<LedgerSeq>,
}

/// Copies a range of ledgers with expanded transactions into a sink.
pub struct RangeImporter;

impl RangeImporter {
    /// Import `start..=end`. Missing ledgers are skipped and reported; a
    /// sink error stops the run.
    pub fn run<S: LedgerSource, K: LedgerSink>(
        source: &mut S,
        sink: &mut K,
        start: LedgerSeq,
        end: LedgerSeq,
    ) -> AuditResult<ImportReport> {
        check_range(start, end)?;
        let mut report = ImportReport::default();
        for seq in start..=end {
            let params = LedgerParams::new(seq).transactions(true).expand(true);
            let Some(ledger) = source.fetch_ledger(params) else {
                debug!(seq, "skipping ledger");
                report.skipped.push(seq);
                continue;
            };
            sink.insert_ledger(&ledger)?;
            report.ledgers_imported += 1;
            for tx in ledger.expanded_transactions() {
                sink.insert_transaction(&ledger, tx)?;
                report.transactions_imported += 1;
            }
        }
        info!(
            start,
            end,
            ledgers = report.ledgers_imported,
            transactions = report.transactions_imported,
            skipped = report.skipped.len(),
            "import finished"
        );
        Ok(report)
    }
}
