//! Invocation receipt summarizing one committed unit of work.
//!
//! The receipt records how many keys were written and deleted and a digest
//! of the exact write batch that reached the ledger. Two replicas running the
//! same invocation against the same snapshot produce identical receipts.

use ssz_rs::prelude::*;

/// Execution receipt for a committed invocation.
///
/// ## Digest
///
/// `write_digest` is SHA-256 over the length-prefixed committed batch
/// (see [`crate::ledger::WriteBatch::digest`]). An invocation that wrote
/// nothing carries the all-zero digest.
///
/// ## Example
///
/// ```
/// use barter_ledger::types::InvocationReceipt;
///
/// let receipt = InvocationReceipt::empty();
/// assert!(receipt.is_noop());
/// assert_eq!(receipt.write_digest, [0u8; 32]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct InvocationReceipt {
    /// Number of keys written
    pub puts: u64,

    /// Number of keys deleted
    pub deletes: u64,

    /// SHA-256 of the committed write batch
    pub write_digest: [u8; 32],
}

impl InvocationReceipt {
    pub fn new(puts: u64, deletes: u64, write_digest: [u8; 32]) -> Self {
        Self {
            puts,
            deletes,
            write_digest,
        }
    }

    /// Receipt of an invocation that committed nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of ledger mutations
    #[inline]
    pub fn writes(&self) -> u64 {
        self.puts + self.deletes
    }

    /// Whether the invocation left the ledger untouched
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.writes() == 0
    }

    /// Digest as a hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.write_digest)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
