use ledgerscope_client::LedgerNodeClient;
use ledgerscope_protocol::{LedgerParams, LedgerSummary};

/// Anything that can hand back a decoded ledger.
///
/// `None` covers every kind of miss: unreachable node, error reply, or an
/// undecodable ledger.
pub trait LedgerSource {
    fn fetch_ledger(&mut self, params: LedgerParams) -> Option<LedgerSummary>;
}

impl LedgerSource for LedgerNodeClient {
    fn fetch_ledger(&mut self, params: LedgerParams) -> Option<LedgerSummary> {
        LedgerNodeClient::fetch_ledger(self, params)
    }
}

impl<S: LedgerSource + ?Sized> LedgerSource for &mut S {
    fn fetch_ledger(&mut self, params: LedgerParams) -> Option<LedgerSummary> {
        (**self).fetch_ledger(params)
    }
}
