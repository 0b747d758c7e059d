//! In-memory ledger backed by a slab.
//!
//! ## Layout
//!
//! - **Slab**: value storage, O(1) insert/remove/lookup, slots reused
//! - **HashMap**: key to slab slot, so a delete frees the slot directly
//!
//! ## Fault injection
//!
//! Tests can take the ledger offline or poison a single key. A poisoned or
//! offline ledger fails the operation with [`LedgerError::Unavailable`]
//! before touching any state, and `apply` validates the whole batch before
//! mutating anything, so a failed commit leaves the ledger unchanged.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::ledger::{KeyValueLedger, LedgerError, WriteBatch, WriteOp};

/// Operation counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    pub gets: u64,
    pub puts: u64,
    pub deletes: u64,
    /// Number of successfully applied batches
    pub batches: u64,
}

/// Slab-backed key-value ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    /// Value storage
    values: Slab<Vec<u8>>,

    /// Key to slab slot
    slots: HashMap<String, usize>,

    /// When set, every operation fails
    offline: bool,

    /// Operations on this key fail
    poisoned: Option<String>,

    gets: Cell<u64>,
    puts: u64,
    deletes: u64,
    batches: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with pre-allocated value slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Slab::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of stored keys
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Copy of all entries in key order
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.slots
            .iter()
            .map(|(key, &slot)| (key.clone(), self.values[slot].clone()))
            .collect()
    }

    /// SHA-256 over all entries in key order
    ///
    /// Equal roots mean equal ledger contents, which is how tests assert that
    /// a failed invocation changed nothing.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for (key, value) in self.snapshot() {
            hasher.update((key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(&value);
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        root
    }

    /// State root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root())
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            gets: self.gets.get(),
            puts: self.puts,
            deletes: self.deletes,
            batches: self.batches,
        }
    }

    // ========================================================================
    // Fault Injection
    // ========================================================================

    /// Take the ledger offline (or bring it back)
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Make every operation on `key` fail
    pub fn poison_key(&mut self, key: impl Into<String>) {
        self.poisoned = Some(key.into());
    }

    pub fn clear_faults(&mut self) {
        self.offline = false;
        self.poisoned = None;
    }

    fn check(&self, op: &'static str, key: &str) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::Rejected {
                key: key.to_string(),
                reason: "empty key".to_string(),
            });
        }
        if self.offline {
            return Err(LedgerError::Unavailable {
                op,
                key: key.to_string(),
                reason: "ledger offline".to_string(),
            });
        }
        if self.poisoned.as_deref() == Some(key) {
            return Err(LedgerError::Unavailable {
                op,
                key: key.to_string(),
                reason: "injected fault".to_string(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Unchecked Mutation
    // ========================================================================

    fn store(&mut self, key: &str, value: Vec<u8>) {
        match self.slots.get(key) {
            Some(&slot) => self.values[slot] = value,
            None => {
                let slot = self.values.insert(value);
                self.slots.insert(key.to_string(), slot);
            }
        }
        self.puts += 1;
    }

    fn remove(&mut self, key: &str) {
        if let Some(slot) = self.slots.remove(key) {
            self.values.remove(slot);
        }
        self.deletes += 1;
    }
}

impl KeyValueLedger for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.check("get", key)?;
        self.gets.set(self.gets.get() + 1);
        Ok(self.slots.get(key).map(|&slot| self.values[slot].clone()))
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.check("put", key)?;
        self.store(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), LedgerError> {
        self.check("delete", key)?;
        self.remove(key);
        Ok(())
    }

    fn apply(&mut self, batch: &WriteBatch) -> Result<(), LedgerError> {
        // Validate everything first so a rejected batch leaves no trace
        for op in batch.iter() {
            let name = match op {
                WriteOp::Put { .. } => "put",
                WriteOp::Delete { .. } => "delete",
            };
            self.check(name, op.key())?;
        }

        for op in batch.iter() {
            match op {
                WriteOp::Put { key, value } => self.store(key, value.clone()),
                WriteOp::Delete { key } => self.remove(key),
            }
        }
        self.batches += 1;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
