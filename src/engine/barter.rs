//! Invocation façade.
//!
//! Every mutating method is one invocation:
//!
//! 1. Begin a [`Transaction`] over the owned ledger
//! 2. Load the aggregates it needs
//! 3. Mutate, then sweep when asset ownership may have changed
//! 4. Commit all writes as one batch
//!
//! Any error drops the transaction before commit, so a failed invocation
//! leaves the ledger exactly as it was.

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::engine::lifecycle::{Settlement, TradeLifecycle};
use crate::engine::sweep::{reconcile, SweepReport};
use crate::error::EngineResult;
use crate::ledger::{KeyValueLedger, Snapshot, Transaction};
use crate::orderbook::OrderBook;
use crate::registry::{AssetRegistry, Removal};
use crate::types::{Asset, Description, InvocationReceipt, OfferId, TradeOffer};

/// Value produced by an invocation together with its receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub receipt: InvocationReceipt,
}

/// Barter engine over a key-value ledger
#[derive(Debug)]
pub struct BarterEngine<L: KeyValueLedger> {
    ledger: L,
    config: EngineConfig,
}

impl<L: KeyValueLedger> BarterEngine<L> {
    /// Create an engine with the default configuration
    pub fn new(ledger: L) -> Self {
        Self::with_config(ledger, EngineConfig::default())
    }

    pub fn with_config(ledger: L, config: EngineConfig) -> Self {
        Self { ledger, config }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access, bypassing invocations
    #[inline]
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    // ========================================================================
    // Invocation plumbing
    // ========================================================================

    /// Run `op` in a fresh transaction and commit on success
    fn invoke<T, F>(&mut self, name: &'static str, op: F) -> EngineResult<Outcome<T>>
    where
        F: FnOnce(&mut Transaction<'_, L>, &EngineConfig) -> EngineResult<T>,
    {
        let mut tx = Transaction::begin(&mut self.ledger);

        let value = match op(&mut tx, &self.config) {
            Ok(value) => value,
            Err(err) => {
                warn!(op = name, error = %err, pending = tx.pending(), "invocation rolled back");
                tx.rollback();
                return Err(err);
            }
        };

        let receipt = tx.commit().map_err(|err| {
            warn!(op = name, error = %err, "commit failed");
            err
        })?;
        info!(
            op = name,
            puts = receipt.puts,
            deletes = receipt.deletes,
            digest = %receipt.digest_hex(),
            "invocation committed"
        );
        Ok(Outcome { value, receipt })
    }

    fn snapshot(&self) -> Snapshot<'_, L> {
        Snapshot::new(&self.ledger)
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Reset the registry, the book and the offer sequence
    ///
    /// Every indexed asset record is deleted along with the index, so no
    /// record outlives its index entry.
    pub fn init(&mut self) -> EngineResult<InvocationReceipt> {
        self.invoke("init", |tx, config| {
            let registry = AssetRegistry::load(&*tx, config)?;
            for id in registry.enumerate_ids() {
                tx.delete(id);
            }
            AssetRegistry::empty(config).persist_index(tx)?;
            OrderBook::empty(config).persist(tx)?;
            tx.delete(&config.offer_seq_key);
            Ok(())
        })
        .map(|outcome| outcome.receipt)
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Register a new asset, then sweep
    pub fn create_asset(&mut self, asset: Asset) -> EngineResult<InvocationReceipt> {
        self.invoke("create_asset", |tx, config| {
            let mut registry = AssetRegistry::load(&*tx, config)?;
            registry.create(tx, asset)?;
            sweep(tx, config, &registry)
        })
        .map(|outcome| outcome.receipt)
    }

    /// Delete an asset, then sweep
    pub fn delete_asset(&mut self, id: &str) -> EngineResult<Outcome<Removal>> {
        self.invoke("delete_asset", |tx, config| {
            let mut registry = AssetRegistry::load(&*tx, config)?;
            let removal = registry.delete(tx, id)?;
            sweep(tx, config, &registry)?;
            Ok(removal)
        })
    }

    /// Reassign an asset, then sweep
    pub fn set_owner(&mut self, id: &str, owner: &str) -> EngineResult<Outcome<Asset>> {
        self.invoke("set_owner", |tx, config| {
            let registry = AssetRegistry::load(&*tx, config)?;
            let asset = registry.set_owner(tx, id, owner)?;
            sweep(tx, config, &registry)?;
            Ok(asset)
        })
    }

    // ========================================================================
    // Offers
    // ========================================================================

    /// Open an offer; no sweep
    pub fn open_trade(
        &mut self,
        owner: &str,
        wanted: Description,
        willing: Vec<Description>,
        now_ms: u64,
    ) -> EngineResult<Outcome<OfferId>> {
        self.invoke("open_trade", |tx, config| {
            let mut book = OrderBook::load(&*tx, config)?;
            TradeLifecycle::new(config).open_trade(tx, &mut book, owner, wanted, willing, now_ms)
        })
    }

    /// Withdraw an offer by textual id; absent ids succeed
    pub fn remove_trade(&mut self, id: &str) -> EngineResult<Outcome<Option<TradeOffer>>> {
        self.invoke("remove_trade", |tx, config| {
            let mut book = OrderBook::load(&*tx, config)?;
            TradeLifecycle::new(config).remove_trade(tx, &mut book, id)
        })
    }

    /// Settle an offer, then sweep; all or nothing
    pub fn perform_trade(
        &mut self,
        offer_id: OfferId,
        closer: &str,
        closer_asset_id: &str,
        alternative_index: usize,
    ) -> EngineResult<Outcome<Settlement>> {
        self.invoke("perform_trade", |tx, config| {
            let registry = AssetRegistry::load(&*tx, config)?;
            let mut book = OrderBook::load(&*tx, config)?;
            let settlement = TradeLifecycle::new(config).perform_trade(
                tx,
                &registry,
                &mut book,
                offer_id,
                closer,
                closer_asset_id,
                alternative_index,
            )?;
            reconcile(&registry, &mut book, tx)?;
            Ok(settlement)
        })
    }

    /// Explicit consistency sweep
    pub fn reconcile(&mut self) -> EngineResult<Outcome<SweepReport>> {
        self.invoke("reconcile", |tx, config| {
            let registry = AssetRegistry::load(&*tx, config)?;
            let mut book = OrderBook::load(&*tx, config)?;
            reconcile(&registry, &mut book, tx)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn lookup_asset(&self, id: &str) -> EngineResult<Option<Asset>> {
        let view = self.snapshot();
        AssetRegistry::load(&view, &self.config)?.lookup(&view, id)
    }

    /// Indexed asset ids in index order
    pub fn asset_ids(&self) -> EngineResult<Vec<String>> {
        let registry = AssetRegistry::load(&self.snapshot(), &self.config)?;
        Ok(registry.enumerate_ids().map(str::to_string).collect())
    }

    /// Open offers in opening order
    pub fn open_offers(&self) -> EngineResult<Vec<TradeOffer>> {
        let book = OrderBook::load(&self.snapshot(), &self.config)?;
        Ok(book.as_slice().to_vec())
    }

    /// Raw ledger value under `key`
    pub fn read(&self, key: &str) -> EngineResult<Option<Vec<u8>>> {
        Ok(self.ledger.get(key)?)
    }
}

/// Load the book and sweep it against `registry`
fn sweep<L: KeyValueLedger + ?Sized>(
    tx: &mut Transaction<'_, L>,
    config: &EngineConfig,
    registry: &AssetRegistry,
) -> EngineResult<()> {
    let mut book = OrderBook::load(&*tx, config)?;
    reconcile(registry, &mut book, tx)?;
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
