use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("cell belongs to row {found}, expected row {expected}")]
    RowMismatch { expected: String, found: String },

    #[error("invalid decimal literal: {0}")]
    InvalidDecimal(String),
}
