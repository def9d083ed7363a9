use chrono::{DateTime, Utc};
use ledgerscope_protocol::{LedgerParams, LedgerSummary};
use ledgerscope_types::{Digest, LedgerSeq};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{check_range, AuditResult};
use crate::source::LedgerSource;

/// Header fields the node returned for a probed sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ObservedHeader {
    pub seq: LedgerSeq,
    pub ledger_hash: Digest,
    pub parent_hash: Digest,
}

impl From<&LedgerSummary> for ObservedHeader {
    fn from(l: &LedgerSummary) -> Self {
        Self {
            seq: l.seq,
            ledger_hash: l.ledger_hash,
            parent_hash: l.parent_hash,
        }
    }
}

/// One row of a probe: what was asked for, when, and what came back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub requested: LedgerSeq,
    pub observed_at: DateTime<Utc>,
    /// `None` when the node had nothing usable for this sequence.
    pub header: Option<ObservedHeader>,
}

impl Observation {
    pub fn is_miss(&self) -> bool {
        self.header.is_none()
    }

    /// Returns `true` if the node answered with a different sequence than
    /// the one requested.
    pub fn is_mismatched(&self) -> bool {
        self.header.is_some_and(|h| h.seq != self.requested)
    }
}

/// Asks a node for every sequence in a range, header only.
pub struct RangeProbe;

impl RangeProbe {
    /// Probe `start..=end`, handing each row to `emit` as it is observed.
    /// Misses are rows too; they never stop the scan.
    pub fn for_each<S: LedgerSource>(
        source: &mut S,
        start: LedgerSeq,
        end: LedgerSeq,
        mut emit: impl FnMut(Observation),
    ) -> AuditResult<()> {
        check_range(start, end)?;
        info!(start, end, "probing ledger range");
        for requested in start..=end {
            let ledger = source.fetch_ledger(LedgerParams::new(requested));
            if ledger.is_none() {
                debug!(seq = requested, "no ledger");
            }
            emit(Observation {
                requested,
                observed_at: Utc::now(),
                header: ledger.as_ref().map(ObservedHeader::from),
            });
        }
        Ok(())
    }

    pub fn run<S: LedgerSource>(source: &mut S, start: LedgerSeq, end: LedgerSeq) -> AuditResult<Vec<Observation>> {
        let mut rows = Vec::new();
        Self::for_each(source, start, end, |row| rows.push(row))?;
        Ok(rows)
    }
}
