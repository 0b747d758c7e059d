//! Per-invocation unit of work.
//!
//! A [`Transaction`] reads through to the ledger and buffers every write in
//! an ordered overlay. Nothing reaches the ledger until [`Transaction::commit`],
//! which hands the overlay over as one [`WriteBatch`]. Dropping the
//! transaction discards the overlay, so an invocation that fails half-way
//! leaves no partial state behind.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ledger::{KeyValueLedger, LedgerError, LedgerView, WriteBatch};
use crate::types::InvocationReceipt;

/// Read-through write overlay over a ledger
pub struct Transaction<'a, L: KeyValueLedger + ?Sized> {
    ledger: &'a mut L,

    /// Pending writes; `None` marks a delete. Key order makes the commit
    /// batch deterministic.
    overlay: BTreeMap<String, Option<Vec<u8>>>,
}

impl<'a, L: KeyValueLedger + ?Sized> Transaction<'a, L> {
    /// Start a unit of work against `ledger`
    pub fn begin(ledger: &'a mut L) -> Self {
        Self {
            ledger,
            overlay: BTreeMap::new(),
        }
    }

    /// Read a value, seeing this transaction's own pending writes
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        match self.overlay.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.ledger.get(key),
        }
    }

    /// Buffer a write
    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        self.overlay.insert(key.to_string(), Some(value));
    }

    /// Buffer a delete
    pub fn delete(&mut self, key: &str) {
        self.overlay.insert(key.to_string(), None);
    }

    /// Whether any write is pending
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// Number of keys with a pending write
    #[inline]
    pub fn pending(&self) -> usize {
        self.overlay.len()
    }

    /// Pending writes as a batch, without committing
    pub fn batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for (key, value) in &self.overlay {
            match value {
                Some(bytes) => batch.put(key.clone(), bytes.clone()),
                None => batch.delete(key.clone()),
            }
        }
        batch
    }

    /// Commit all pending writes as one batch
    ///
    /// A transaction with no pending writes commits nothing and does not
    /// call the ledger at all.
    pub fn commit(self) -> Result<InvocationReceipt, LedgerError> {
        if self.overlay.is_empty() {
            debug!("commit: nothing to write");
            return Ok(InvocationReceipt::empty());
        }

        let batch = self.batch();
        self.ledger.apply(&batch)?;

        let receipt = InvocationReceipt::new(batch.puts(), batch.deletes(), batch.digest());
        debug!(
            puts = receipt.puts,
            deletes = receipt.deletes,
            digest = %receipt.digest_hex(),
            "commit applied"
        );
        Ok(receipt)
    }

    /// Discard all pending writes
    pub fn rollback(self) {
        if !self.overlay.is_empty() {
            debug!(pending = self.overlay.len(), "rollback discarded pending writes");
        }
    }
}

impl<L: KeyValueLedger + ?Sized> LedgerView for Transaction<'_, L> {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.get(key)
    }
}

/// Read-only view straight over a ledger, for queries
pub struct Snapshot<'a, L: KeyValueLedger + ?Sized> {
    ledger: &'a L,
}

impl<'a, L: KeyValueLedger + ?Sized> Snapshot<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }
}

impl<L: KeyValueLedger + ?Sized> LedgerView for Snapshot<'_, L> {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.ledger.get(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
