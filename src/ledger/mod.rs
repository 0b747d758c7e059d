//! Key-value ledger collaborator.
//!
//! ## Contract
//!
//! The engine consumes exactly three primitive operations from the host
//! ledger: `get`, `put`, `delete`. Writes made during one invocation are
//! buffered in a [`Transaction`] and handed to the ledger as a single
//! [`WriteBatch`] through [`KeyValueLedger::apply`]; hosts that can commit a
//! batch atomically should override `apply`.
//!
//! ## Components
//!
//! - [`KeyValueLedger`]: The storage trait
//! - [`WriteBatch`]: Ordered put/delete operations committed together
//! - [`Transaction`]: Read-through write overlay for one invocation
//! - [`LedgerView`]: Read access shared by transactions and [`Snapshot`]s
//! - [`MemoryLedger`]: Slab-backed in-memory ledger with fault injection
//! - [`codec`]: SSZ encoding of every stored value

pub mod codec;
mod memory;
mod transaction;

pub use memory::{LedgerStats, MemoryLedger};
pub use transaction::{Snapshot, Transaction};

use sha2::{Digest, Sha256};
use thiserror::Error;

// ============================================================================
// LedgerError
// ============================================================================

/// Failure reported by the backing ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not serve the operation
    #[error("ledger {op} failed for key {key:?}: {reason}")]
    Unavailable {
        op: &'static str,
        key: String,
        reason: String,
    },

    /// The ledger refused the key itself
    #[error("ledger rejected key {key:?}: {reason}")]
    Rejected { key: String, reason: String },
}

// ============================================================================
// KeyValueLedger
// ============================================================================

/// Transactional key-value store the engine runs against
pub trait KeyValueLedger {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write a value, replacing any previous one
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Remove a key; removing an absent key succeeds
    fn delete(&mut self, key: &str) -> Result<(), LedgerError>;

    /// Commit a batch of writes
    ///
    /// The default applies operations in order and stops at the first
    /// failure. Atomicity then depends on the host discarding the whole
    /// invocation on error.
    fn apply(&mut self, batch: &WriteBatch) -> Result<(), LedgerError> {
        for op in batch.iter() {
            match op {
                WriteOp::Put { key, value } => self.put(key, value.clone())?,
                WriteOp::Delete { key } => self.delete(key)?,
            }
        }
        Ok(())
    }
}

/// Read-only access to ledger values
///
/// Loaders and lookups take a view so they run both inside a
/// [`Transaction`] and against a [`Snapshot`] for queries.
pub trait LedgerView {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;
}

// ============================================================================
// WriteBatch
// ============================================================================

/// One buffered ledger mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// Ordered set of writes committed as one unit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
        });
    }

    pub fn delete(&mut self, key: impl Into<String>) {
        self.ops.push(WriteOp::Delete { key: key.into() });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.ops.iter()
    }

    /// Number of put operations
    pub fn puts(&self) -> u64 {
        self.ops
            .iter()
            .filter(|op| matches!(op, WriteOp::Put { .. }))
            .count() as u64
    }

    /// Number of delete operations
    pub fn deletes(&self) -> u64 {
        self.ops.len() as u64 - self.puts()
    }

    /// SHA-256 over the length-prefixed operations, all-zero when empty
    ///
    /// Layout per op: tag byte (0 = put, 1 = delete), key length (u64 LE),
    /// key bytes, and for puts value length (u64 LE) and value bytes.
    pub fn digest(&self) -> [u8; 32] {
        if self.ops.is_empty() {
            return [0u8; 32];
        }

        let mut hasher = Sha256::new();
        for op in &self.ops {
            match op {
                WriteOp::Put { key, value } => {
                    hasher.update([0u8]);
                    hasher.update((key.len() as u64).to_le_bytes());
                    hasher.update(key.as_bytes());
                    hasher.update((value.len() as u64).to_le_bytes());
                    hasher.update(value);
                }
                WriteOp::Delete { key } => {
                    hasher.update([1u8]);
                    hasher.update((key.len() as u64).to_le_bytes());
                    hasher.update(key.as_bytes());
                }
            }
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&hasher.finalize());
        hash
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
