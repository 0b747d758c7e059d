//! Engine configuration.
//!
//! Holds the well-known ledger keys and the structural limits applied to
//! incoming offers. Defaults match the layout every deployment uses; the
//! `with_*` builders exist for tests and side-by-side deployments on a
//! shared ledger.

use crate::ledger::codec::{MAX_ALTERNATIVES, MAX_OFFERS};

/// Default key holding the serialized asset index
pub const DEFAULT_INDEX_KEY: &str = "_assetindex";

/// Default key holding the serialized order book
pub const DEFAULT_ORDER_BOOK_KEY: &str = "_opentrades";

/// Default key holding the last issued offer id
pub const DEFAULT_OFFER_SEQ_KEY: &str = "_offerseq";

/// Default cap on alternatives per offer
pub const DEFAULT_MAX_ALTERNATIVES: usize = 16;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Ledger key of the asset index blob
    pub index_key: String,

    /// Ledger key of the order book blob
    pub order_book_key: String,

    /// Ledger key of the offer id sequence
    pub offer_seq_key: String,

    /// Maximum number of willing alternatives on one offer
    pub max_alternatives: usize,

    /// Maximum number of open offers in the book
    pub max_offers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_key: DEFAULT_INDEX_KEY.to_string(),
            order_book_key: DEFAULT_ORDER_BOOK_KEY.to_string(),
            offer_seq_key: DEFAULT_OFFER_SEQ_KEY.to_string(),
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            max_offers: MAX_OFFERS,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a key prefix for all well-known keys
    ///
    /// ```
    /// use barter_ledger::EngineConfig;
    ///
    /// let config = EngineConfig::new().with_key_prefix("shop1");
    /// assert_eq!(config.index_key, "shop1_assetindex");
    /// ```
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.index_key = format!("{prefix}{DEFAULT_INDEX_KEY}");
        self.order_book_key = format!("{prefix}{DEFAULT_ORDER_BOOK_KEY}");
        self.offer_seq_key = format!("{prefix}{DEFAULT_OFFER_SEQ_KEY}");
        self
    }

    /// Set the per-offer alternatives cap (clamped to the codec bound)
    pub fn with_max_alternatives(mut self, max: usize) -> Self {
        self.max_alternatives = max.clamp(1, MAX_ALTERNATIVES);
        self
    }

    /// Set the open offer cap (clamped to the codec bound)
    pub fn with_max_offers(mut self, max: usize) -> Self {
        self.max_offers = max.clamp(1, MAX_OFFERS);
        self
    }

    /// Whether `key` is one of the engine's reserved keys
    pub fn is_reserved_key(&self, key: &str) -> bool {
        key == self.index_key || key == self.order_book_key || key == self.offer_seq_key
    }
}
