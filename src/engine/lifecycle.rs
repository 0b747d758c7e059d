//! Opening, withdrawing and settling offers.
//!
//! Each operation mutates the loaded aggregates and buffers its writes in
//! the caller's [`Transaction`]; nothing here commits. A returned error
//! means the caller must drop the transaction.

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::matcher::matches;
use crate::engine::sweep::find_satisfying_asset;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{codec, KeyValueLedger, Transaction};
use crate::orderbook::OrderBook;
use crate::registry::AssetRegistry;
use crate::types::{Asset, Description, OfferId, TradeOffer};

/// Result of a settled trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// The offer that was filled (already removed from the book)
    pub offer: TradeOffer,

    /// Asset the closer handed over, now owned by the offer's owner
    pub received: Asset,

    /// Asset the offer's owner handed over, now owned by the closer
    pub delivered: Asset,
}

/// Trade operations bound to one configuration
#[derive(Debug, Clone, Copy)]
pub struct TradeLifecycle<'c> {
    config: &'c EngineConfig,
}

impl<'c> TradeLifecycle<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    // ========================================================================
    // Open
    // ========================================================================

    /// Validate and append a new offer, returning its id
    ///
    /// Satisfiability of `willing` is not checked here; the next sweep
    /// prunes whatever the owner cannot deliver.
    pub fn open_trade<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
        book: &mut OrderBook,
        owner: &str,
        wanted: Description,
        willing: Vec<Description>,
        now_ms: u64,
    ) -> EngineResult<OfferId> {
        if owner.is_empty() {
            return Err(EngineError::invalid("offer owner must be a non-empty string"));
        }
        if willing.is_empty() {
            return Err(EngineError::invalid("offer needs at least one alternative"));
        }
        if willing.len() > self.config.max_alternatives {
            return Err(EngineError::invalid(format!(
                "offer has {} alternatives, limit is {}",
                willing.len(),
                self.config.max_alternatives
            )));
        }
        wanted.validate()?;
        for alternative in &willing {
            alternative.validate()?;
        }

        let id = OfferId::next(now_ms, self.last_issued(tx, book)?)?;
        let offer = TradeOffer::new(id, owner, now_ms, wanted, willing);
        book.add_offer(offer)?;
        book.persist(tx)?;

        let seq = codec::encode_seq(id).map_err(EngineError::from_encode)?;
        tx.put(&self.config.offer_seq_key, seq);

        info!(offer = %id, owner, open = book.len(), "offer opened");
        Ok(id)
    }

    /// Highest id handed out so far
    ///
    /// The stored sequence is authoritative; open offer ids are folded in
    /// so a book written without a sequence key still gets fresh ids.
    fn last_issued<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &Transaction<'_, L>,
        book: &OrderBook,
    ) -> EngineResult<Option<OfferId>> {
        let key = &self.config.offer_seq_key;
        let stored = match tx.get(key)? {
            Some(bytes) => Some(codec::decode_seq(key, &bytes)?),
            None => None,
        };
        let open = book.iter().map(|offer| offer.id).max();
        Ok(stored.max(open))
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Withdraw an offer by its textual id
    ///
    /// Withdrawing an id that is not open succeeds and writes nothing.
    pub fn remove_trade<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
        book: &mut OrderBook,
        id: &str,
    ) -> EngineResult<Option<TradeOffer>> {
        let id: OfferId = id.parse()?;

        match book.remove_offer(id) {
            Some(offer) => {
                book.persist(tx)?;
                info!(offer = %id, owner = %offer.owner, "offer withdrawn");
                Ok(Some(offer))
            }
            None => {
                debug!(offer = %id, "withdraw of an offer that is not open");
                Ok(None)
            }
        }
    }

    // ========================================================================
    // Perform
    // ========================================================================

    /// Settle `offer_id` against `closer_asset_id`
    ///
    /// The closer gives an asset matching the offer's wanted description and
    /// receives the offer owner's asset matching `willing[alternative_index]`.
    /// Owners are swapped and the offer is removed. Every failed precondition
    /// is `TradeUnsatisfiable`; the caller runs the sweep afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn perform_trade<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
        registry: &AssetRegistry,
        book: &mut OrderBook,
        offer_id: OfferId,
        closer: &str,
        closer_asset_id: &str,
        alternative_index: usize,
    ) -> EngineResult<Settlement> {
        let offer = book
            .get(offer_id)
            .cloned()
            .ok_or_else(|| EngineError::unsatisfiable(format!("offer {offer_id} is not open")))?;

        if closer.is_empty() {
            return Err(EngineError::invalid("closer must be a non-empty string"));
        }
        if offer.owner.eq_ignore_ascii_case(closer) {
            return Err(EngineError::unsatisfiable(format!(
                "{closer} cannot close their own offer {offer_id}"
            )));
        }

        let alternative = offer.alternative(alternative_index).ok_or_else(|| {
            EngineError::unsatisfiable(format!(
                "offer {offer_id} has no alternative {alternative_index}"
            ))
        })?;

        let mut received = registry.lookup(&*tx, closer_asset_id)?.ok_or_else(|| {
            EngineError::unsatisfiable(format!("closer asset {closer_asset_id} does not exist"))
        })?;
        if !matches(&received, closer, &offer.wanted) {
            return Err(EngineError::unsatisfiable(format!(
                "asset {closer_asset_id} does not satisfy {} for {closer}",
                offer.wanted
            )));
        }

        let mut delivered = find_satisfying_asset(registry, &*tx, &offer.owner, alternative)?
            .ok_or_else(|| {
                warn!(offer = %offer_id, owner = %offer.owner, wanted = %alternative, "owner cannot deliver");
                EngineError::unsatisfiable(format!(
                    "{} holds no asset matching {alternative}",
                    offer.owner
                ))
            })?;

        received.owner = offer.owner.clone();
        delivered.owner = closer.to_string();
        registry.update(tx, &received)?;
        registry.update(tx, &delivered)?;

        book.remove_offer(offer_id);
        book.persist(tx)?;

        info!(
            offer = %offer_id,
            opener = %offer.owner,
            closer,
            received = %received.id,
            delivered = %delivered.id,
            "trade settled"
        );
        Ok(Settlement {
            offer,
            received,
            delivered,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
