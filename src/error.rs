//! Error taxonomy for the barter engine.
//!
//! Every invocation returns [`EngineError`]. Ledger and codec failures are
//! wrapped rather than retried: retry policy belongs to the host that owns
//! the transaction.

use thiserror::Error;

use crate::ledger::codec::CodecError;
use crate::ledger::LedgerError;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An asset with this identifier already has a record
    #[error("asset already exists: {id}")]
    DuplicateAsset { id: String },

    /// Lookup or delete of an identifier with no record
    #[error("asset not found: {id}")]
    NotFound { id: String },

    /// Malformed or structurally invalid input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `perform_trade` preconditions failed; nothing was changed
    #[error("trade unsatisfiable: {reason}")]
    TradeUnsatisfiable { reason: String },

    /// The backing ledger failed a get/put/delete
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] LedgerError),

    /// A stored value could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }

    pub(crate) fn unsatisfiable(reason: impl Into<String>) -> Self {
        EngineError::TradeUnsatisfiable {
            reason: reason.into(),
        }
    }

    /// Encoding a caller-supplied value: an over-long field is the caller's fault
    pub(crate) fn from_encode(err: CodecError) -> Self {
        match err {
            CodecError::TooLong { .. } => EngineError::InvalidArgument(err.to_string()),
            other => EngineError::Codec(other),
        }
    }
}

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, EngineError>;
