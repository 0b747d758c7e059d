//! Order book aggregate.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{codec, KeyValueLedger, LedgerView, Transaction};
use crate::types::{OfferId, TradeOffer};

/// In-memory view of the open offers for one invocation
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Ledger key the book is persisted under
    key: String,

    /// Cap on open offers
    max_offers: usize,

    /// Offers in the order they were opened
    offers: Vec<TradeOffer>,
}

impl OrderBook {
    /// Load the book; an absent key is an empty book
    pub fn load<V: LedgerView + ?Sized>(view: &V, config: &EngineConfig) -> EngineResult<Self> {
        let offers = match view.read(&config.order_book_key)? {
            Some(bytes) => codec::decode_offers(&config.order_book_key, &bytes)?,
            None => Vec::new(),
        };
        debug!(offers = offers.len(), "order book loaded");

        Ok(Self {
            key: config.order_book_key.clone(),
            max_offers: config.max_offers,
            offers,
        })
    }

    /// An empty book
    pub fn empty(config: &EngineConfig) -> Self {
        Self {
            key: config.order_book_key.clone(),
            max_offers: config.max_offers,
            offers: Vec::new(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append an offer
    ///
    /// Fails when the book is full or the id is already open.
    pub fn add_offer(&mut self, offer: TradeOffer) -> EngineResult<()> {
        if self.offers.len() >= self.max_offers {
            return Err(EngineError::invalid(format!(
                "order book is full ({} open offers)",
                self.max_offers
            )));
        }
        if self.get(offer.id).is_some() {
            return Err(EngineError::invalid(format!(
                "offer {} is already open",
                offer.id
            )));
        }

        self.offers.push(offer);
        Ok(())
    }

    /// Remove the first offer with `id`, if any
    pub fn remove_offer(&mut self, id: OfferId) -> Option<TradeOffer> {
        let position = self.offers.iter().position(|offer| offer.id == id)?;
        Some(self.offers.remove(position))
    }

    /// Mutable view for in-place pruning
    pub fn offers_mut(&mut self) -> &mut Vec<TradeOffer> {
        &mut self.offers
    }

    /// Write the book back
    pub fn persist<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
    ) -> EngineResult<()> {
        let bytes = codec::encode_offers(&self.offers).map_err(EngineError::from_encode)?;
        tx.put(&self.key, bytes);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: OfferId) -> Option<&TradeOffer> {
        self.offers.iter().find(|offer| offer.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeOffer> {
        self.offers.iter()
    }

    /// Offers as a slice, in opening order
    pub fn as_slice(&self) -> &[TradeOffer] {
        &self.offers
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
