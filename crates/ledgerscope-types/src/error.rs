use thiserror::Error;

/// Validation errors produced when constructing foundation types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid ledger identifier: {0:?}")]
    InvalidLedgerId(String),
}
