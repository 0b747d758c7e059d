//! Core data types for the barter ledger
//!
//! ## Types
//!
//! - [`Asset`]: A uniquely identified record with owner, category and quantity
//! - [`SlipDetails`]: Descriptive slip attributes carried on an asset
//! - [`Description`]: Partial match pattern (category + quantity)
//! - [`TradeOffer`]: An open barter order with one wanted description and
//!   ordered willing alternatives
//! - [`OfferId`]: Monotonic millisecond offer identifier
//! - [`InvocationReceipt`]: Summary of one committed invocation
//!
//! Monetary attributes use the fixed-point helpers in [`price`].

mod asset;
mod description;
mod offer;
mod receipt;
pub mod price;

pub use asset::{Asset, SlipDetails};
pub use description::Description;
pub use offer::{OfferId, TradeOffer};
pub use receipt::InvocationReceipt;
