//! Barter matching engine.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same ledger contents and inputs always produce the
//!    same writes, in the same order
//! 2. **Index order**: The first satisfying asset in index order wins
//! 3. **Atomic invocations**: Each entry point commits one write batch or
//!    nothing
//! 4. **Self-healing book**: Every asset mutation is followed by a sweep
//!    that prunes promises owners can no longer keep
//!
//! ## Components
//!
//! - [`matches`]: Pure description predicate
//! - [`find_satisfying_asset`] / [`reconcile`]: Stateless search and sweep
//! - [`TradeLifecycle`]: Open, withdraw and settle offers
//! - [`BarterEngine`]: Invocation façade owning the ledger
//!
//! ## Example
//!
//! ```
//! use barter_ledger::engine::BarterEngine;
//! use barter_ledger::ledger::MemoryLedger;
//! use barter_ledger::types::{Asset, Description};
//!
//! let mut engine = BarterEngine::new(MemoryLedger::new());
//! engine.init().unwrap();
//! engine.create_asset(Asset::new("A1", "bob", "blue", 16)).unwrap();
//! engine.create_asset(Asset::new("A2", "alice", "red", 16)).unwrap();
//!
//! let offer = engine
//!     .open_trade("alice", Description::new("blue", 16), vec![Description::new("red", 16)], 1_000)
//!     .unwrap()
//!     .value;
//!
//! engine.perform_trade(offer, "bob", "A1", 0).unwrap();
//! assert_eq!(engine.lookup_asset("A2").unwrap().unwrap().owner, "bob");
//! assert!(engine.open_offers().unwrap().is_empty());
//! ```

mod barter;
mod lifecycle;
mod matcher;
mod sweep;

pub use barter::{BarterEngine, Outcome};
pub use lifecycle::{Settlement, TradeLifecycle};
pub use matcher::{first_match, matches};
pub use sweep::{find_satisfying_asset, reconcile, SweepReport};
