//! Open barter offers.
//!
//! ## Architecture
//!
//! Unlike a price-ordered book there is no price priority: offers are kept
//! in the order they were opened, which is also ascending id order. The whole
//! book lives under one ledger key and is loaded, mutated and persisted once
//! per invocation.
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add offer | O(1) amortized |
//! | Remove by id | O(n) |
//! | Get by id | O(n) |
//! | Persist | O(n) encode |
//!
//! ## Example
//!
//! ```
//! use barter_ledger::orderbook::OrderBook;
//! use barter_ledger::types::{Description, OfferId, TradeOffer};
//! use barter_ledger::EngineConfig;
//!
//! let mut book = OrderBook::empty(&EngineConfig::default());
//! let offer = TradeOffer::new(
//!     OfferId(1),
//!     "alice",
//!     1,
//!     Description::new("blue", 16),
//!     vec![Description::new("red", 16)],
//! );
//! book.add_offer(offer).unwrap();
//!
//! assert_eq!(book.len(), 1);
//! assert!(book.remove_offer(OfferId(1)).is_some());
//! assert!(book.is_empty());
//! ```

mod book;

pub use book::OrderBook;
