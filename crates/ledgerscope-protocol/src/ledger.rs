//! Typed view of the `result.ledger` object of a `ledger` reply.

use ledgerscope_types::{Digest, LedgerSeq};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The node encodes large integers as decimal strings; accept both forms.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(u64),
    Text(String),
}

impl Lenient {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s.trim().parse().map_err(|_| format!("not an integer: {s:?}")),
        }
    }
}

/// Shape of the ledger object as sent by the node.
#[derive(Deserialize)]
struct WireLedger {
    #[serde(rename = "seqNum")]
    seq_num: Option<Lenient>,
    ledger_index: Option<Lenient>,
    ledger_hash: Option<Digest>,
    parent_hash: Digest,
    total_coins: Option<Lenient>,
    close_time: Option<u64>,
    close_time_resolution: Option<u32>,
    close_time_human: Option<String>,
    close_time_estimated: Option<bool>,
    account_hash: Option<Digest>,
    transaction_hash: Option<Digest>,
    accepted: Option<bool>,
    closed: Option<bool>,
    #[serde(default)]
    transactions: Vec<TransactionEntry>,
}

/// Ledger header fields and transactions reported by the node.
///
/// The open ledger has no hash yet; it is reported with `closed ==
/// Some(false)` and a zero `ledger_hash`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireLedger")]
pub struct LedgerSummary {
    #[serde(rename = "seqNum")]
    pub seq: LedgerSeq,
    pub ledger_hash: Digest,
    pub parent_hash: Digest,
    pub total_coins: Option<u64>,
    pub close_time: Option<u64>,
    pub close_time_resolution: Option<u32>,
    pub close_time_human: Option<String>,
    pub close_time_estimated: Option<bool>,
    pub account_hash: Option<Digest>,
    pub transaction_hash: Option<Digest>,
    pub accepted: Option<bool>,
    pub closed: Option<bool>,
    pub transactions: Vec<TransactionEntry>,
}

impl TryFrom<WireLedger> for LedgerSummary {
    type Error = String;

    fn try_from(w: WireLedger) -> Result<Self, Self::Error> {
        let seq = w
            .seq_num
            .or(w.ledger_index)
            .ok_or_else(|| "missing seqNum".to_string())?
            .into_u64()?;
        let seq = LedgerSeq::try_from(seq).map_err(|_| format!("seqNum out of range: {seq}"))?;
        let ledger_hash = match (w.ledger_hash, w.closed) {
            (Some(hash), _) => hash,
            (None, Some(false)) => Digest::zero(),
            (None, _) => return Err("missing ledger_hash".into()),
        };
        Ok(Self {
            seq,
            ledger_hash,
            parent_hash: w.parent_hash,
            total_coins: w.total_coins.map(Lenient::into_u64).transpose()?,
            close_time: w.close_time,
            close_time_resolution: w.close_time_resolution,
            close_time_human: w.close_time_human,
            close_time_estimated: w.close_time_estimated,
            account_hash: w.account_hash,
            transaction_hash: w.transaction_hash,
            accepted: w.accepted,
            closed: w.closed,
            transactions: w.transactions,
        })
    }
}

impl LedgerSummary {
    /// Returns `true` for the still-open ledger, which has no hash yet.
    pub fn is_open(&self) -> bool {
        self.closed == Some(false)
    }

    /// Transactions returned in expanded form.
    pub fn expanded_transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter_map(|t| match t {
            TransactionEntry::Expanded(record) => Some(record.as_ref()),
            TransactionEntry::Hash(_) => None,
        })
    }
}

/// A transaction in a ledger reply: a bare hash unless `expand` was set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionEntry {
    Hash(Digest),
    Expanded(Box<TransactionRecord>),
}

impl TransactionEntry {
    pub fn hash(&self) -> Option<Digest> {
        match self {
            Self::Hash(hash) => Some(*hash),
            Self::Expanded(record) => record.hash,
        }
    }
}

/// Fields of an expanded transaction. Amount-like fields stay raw JSON
/// since they are either a drops string or an issued-currency object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TransactionRecord {
    pub account: Option<String>,
    pub destination: Option<String>,
    pub amount: Option<Value>,
    pub fee: Option<String>,
    pub flags: Option<u32>,
    pub paths: Option<Value>,
    pub send_max: Option<Value>,
    pub offer_sequence: Option<u32>,
    pub sequence: Option<u32>,
    pub signing_pub_key: Option<String>,
    pub taker_gets: Option<Value>,
    pub taker_pays: Option<Value>,
    pub transaction_type: Option<String>,
    pub txn_signature: Option<String>,
    #[serde(rename = "hash")]
    pub hash: Option<Digest>,
    #[serde(rename = "metaData")]
    pub meta_data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aa() -> String {
        "AA".repeat(32)
    }

    fn bb() -> String {
        "BB".repeat(32)
    }

    #[test]
    fn numeric_seq_num() {
        let l: LedgerSummary =
            serde_json::from_value(json!({"seqNum": 5, "ledger_hash": aa(), "parent_hash": bb()}))
                .unwrap();
        assert_eq!(l.seq, 5);
        assert_eq!(l.ledger_hash, Digest::from_hex(&aa()).unwrap());
        assert_eq!(l.parent_hash, Digest::from_hex(&bb()).unwrap());
        assert!(l.transactions.is_empty());
    }

    #[test]
    fn string_fields_as_the_node_sends_them() {
        let l: LedgerSummary = serde_json::from_value(json!({
            "seqNum": "32570",
            "ledger_index": "32570",
            "ledger_hash": aa(),
            "parent_hash": bb(),
            "total_coins": "99999999999999999",
            "close_time": 410424200,
            "close_time_resolution": 30,
            "close_time_human": "2013-Jan-01 06:43:20",
            "accepted": true,
            "closed": true,
            "account_hash": aa(),
            "transaction_hash": bb()
        }))
        .unwrap();
        assert_eq!(l.seq, 32570);
        assert_eq!(l.total_coins, Some(99_999_999_999_999_999));
        assert_eq!(l.close_time_resolution, Some(30));
        assert_eq!(l.closed, Some(true));
    }

    #[test]
    fn ledger_index_fallback() {
        let l: LedgerSummary = serde_json::from_value(
            json!({"ledger_index": "9", "ledger_hash": aa(), "parent_hash": bb()}),
        )
        .unwrap();
        assert_eq!(l.seq, 9);
    }

    #[test]
    fn missing_sequence_rejected() {
        let r: Result<LedgerSummary, _> =
            serde_json::from_value(json!({"ledger_hash": aa(), "parent_hash": bb()}));
        assert!(r.unwrap_err().to_string().contains("missing seqNum"));
    }

    #[test]
    fn open_ledger_without_hash() {
        let l: LedgerSummary = serde_json::from_value(json!({
            "closed": false,
            "seqNum": "32571",
            "parent_hash": bb(),
            "total_coins": "99999999999999999"
        }))
        .unwrap();
        assert_eq!(l.seq, 32571);
        assert!(l.is_open());
        assert!(l.ledger_hash.is_zero());
        assert_eq!(l.parent_hash, Digest::from_hex(&bb()).unwrap());
    }

    #[test]
    fn closed_ledger_requires_hash() {
        for closed in [json!(true), json!(null)] {
            let r: Result<LedgerSummary, _> =
                serde_json::from_value(json!({"seqNum": 4, "closed": closed, "parent_hash": bb()}));
            assert!(r.unwrap_err().to_string().contains("missing ledger_hash"));
        }
    }

    #[test]
    fn hash_only_and_expanded_transactions() {
        let l: LedgerSummary = serde_json::from_value(json!({
            "seqNum": 7,
            "ledger_hash": aa(),
            "parent_hash": bb(),
            "transactions": [
                aa(),
                {
                    "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
                    "Destination": "rPMh7Pi9ct699iZUTWaytJUoHcJ7cgyziK",
                    "Amount": "1000000",
                    "Fee": "10",
                    "Sequence": 1,
                    "TransactionType": "Payment",
                    "hash": bb(),
                    "metaData": {"TransactionResult": "tesSUCCESS"}
                }
            ]
        }))
        .unwrap();
        assert_eq!(l.transactions.len(), 2);
        assert_eq!(l.transactions[0].hash(), Some(Digest::from_hex(&aa()).unwrap()));

        let expanded: Vec<_> = l.expanded_transactions().collect();
        assert_eq!(expanded.len(), 1);
        let tx = expanded[0];
        assert_eq!(tx.transaction_type.as_deref(), Some("Payment"));
        assert_eq!(tx.fee.as_deref(), Some("10"));
        assert_eq!(tx.sequence, Some(1));
        assert_eq!(tx.meta_data.as_ref().unwrap()["TransactionResult"], "tesSUCCESS");
        assert_eq!(l.transactions[1].hash(), Some(Digest::from_hex(&bb()).unwrap()));
    }
}
