use std::fmt;
use std::str::FromStr;

use ledgerscope_types::{Digest, LedgerId, LedgerSeq, TypeError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ProtocolError, ProtocolResult};
use crate::ledger::LedgerSummary;

/// Method names understood by the node.
pub mod methods {
    pub const SERVER_INFO: &str = "server_info";
    pub const LEDGER: &str = "ledger";
}

/// Request envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
}

impl CommandRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            id: None,
            params: None,
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Which ledger a remote `ledger` command asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerSelector {
    Id(LedgerId),
    /// Most recent validated ledger.
    Validated,
    /// Most recent closed ledger.
    Closed,
    /// The open ledger.
    Current,
}

impl Serialize for LedgerSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(LedgerId::Sequence(seq)) => serializer.serialize_u32(*seq),
            Self::Id(LedgerId::Hash(hash)) => hash.serialize(serializer),
            Self::Validated => serializer.serialize_str("validated"),
            Self::Closed => serializer.serialize_str("closed"),
            Self::Current => serializer.serialize_str("current"),
        }
    }
}

impl fmt::Display for LedgerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Validated => write!(f, "validated"),
            Self::Closed => write!(f, "closed"),
            Self::Current => write!(f, "current"),
        }
    }
}

impl FromStr for LedgerSelector {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "validated" => Ok(Self::Validated),
            "closed" => Ok(Self::Closed),
            "current" => Ok(Self::Current),
            other => other.parse().map(Self::Id),
        }
    }
}

impl From<LedgerSeq> for LedgerSelector {
    fn from(seq: LedgerSeq) -> Self {
        Self::Id(LedgerId::Sequence(seq))
    }
}

impl From<Digest> for LedgerSelector {
    fn from(hash: Digest) -> Self {
        Self::Id(LedgerId::Hash(hash))
    }
}

impl From<LedgerId> for LedgerSelector {
    fn from(id: LedgerId) -> Self {
        Self::Id(id)
    }
}

/// Parameters element of a `ledger` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerParams {
    pub ledger: LedgerSelector,
    pub full: bool,
    pub accounts: bool,
    pub transactions: bool,
    pub expand: bool,
}

impl LedgerParams {
    /// Header only: every flag off.
    pub fn new(ledger: impl Into<LedgerSelector>) -> Self {
        Self {
            ledger: ledger.into(),
            full: false,
            accounts: false,
            transactions: false,
            expand: false,
        }
    }

    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn accounts(mut self, accounts: bool) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn transactions(mut self, transactions: bool) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn to_value(&self) -> ProtocolResult<Value> {
        serde_json::to_value(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }
}

/// Reply envelope.
///
/// Only "is a JSON object" is enforced; everything else is read through
/// accessors that tolerate missing fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplyEnvelope {
    body: Map<String, Value>,
}

impl ReplyEnvelope {
    pub fn from_value(value: Value) -> ProtocolResult<Self> {
        match value {
            Value::Object(body) => Ok(Self { body }),
            _ => Err(ProtocolError::NotAnObject),
        }
    }

    /// Echoed request id, if the node sent one.
    pub fn id(&self) -> Option<&Value> {
        self.body.get("id")
    }

    pub fn result(&self) -> Option<&Value> {
        self.body.get("result")
    }

    /// `result.status`.
    pub fn status(&self) -> Option<&str> {
        self.result()?.get("status")?.as_str()
    }

    /// Returns `true` iff `result.status == "success"`.
    pub fn is_success(&self) -> bool {
        self.status() == Some("success")
    }

    /// Error token reported by the node, from `result.error` or a top-level
    /// `error` field.
    pub fn error(&self) -> Option<&str> {
        self.result()
            .and_then(|r| r.get("error"))
            .or_else(|| self.body.get("error"))
            .and_then(Value::as_str)
    }

    /// Decode `result.ledger`.
    ///
    /// A reply without `status == "success"` carries no usable ledger and
    /// yields `Ok(None)`.
    pub fn ledger(&self) -> ProtocolResult<Option<LedgerSummary>> {
        if !self.is_success() {
            return Ok(None);
        }
        let Some(ledger) = self.result().and_then(|r| r.get("ledger")) else {
            return Ok(None);
        };
        LedgerSummary::deserialize(ledger)
            .map(Some)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}
