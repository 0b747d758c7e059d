//! # Barter Ledger
//!
//! Deterministic asset registry and barter matching engine over a
//! transactional key-value ledger.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Asset, Description, TradeOffer, InvocationReceipt)
//! - **Ledger**: Storage trait, per-invocation transactions, SSZ codec
//! - **Registry**: Asset records plus the identifier index
//! - **OrderBook**: Open offers in opening order
//! - **Engine**: Matching, consistency sweep, trade lifecycle and the invocation façade
//! - **Dispatch**: Function-name routing over flat string arguments
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical ledger contents and inputs produce identical write batches
//! 2. **No Floating Point**: Money uses fixed-point arithmetic (10^8 scaling)
//! 3. **All-or-nothing**: Each invocation commits one batch or leaves the ledger untouched
//! 4. **Synchronous Execution**: No threads or async inside the engine

// ============================================================================
// Module declarations
// ============================================================================

/// Engine configuration: ledger keys and limits
pub mod config;

/// Error taxonomy
pub mod error;

/// Core data types: Asset, Description, TradeOffer, InvocationReceipt
pub mod types;

/// Ledger trait, transactions and the stored-value codec
pub mod ledger;

/// Asset registry and index
pub mod registry;

/// Open offer book
pub mod orderbook;

/// Matching, sweep, lifecycle and the engine façade
pub mod engine;

/// Function-name dispatch
pub mod dispatch;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use dispatch::{dispatch, Response};
pub use engine::{BarterEngine, Outcome, Settlement, SweepReport};
pub use error::{EngineError, EngineResult};
pub use ledger::{KeyValueLedger, LedgerError, MemoryLedger, Transaction};
pub use types::{Asset, Description, InvocationReceipt, OfferId, SlipDetails, TradeOffer};
