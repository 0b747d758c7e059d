//! Satisfying-asset search and the consistency sweep.
//!
//! ## Sweep
//!
//! After any asset mutation an offer may promise an alternative its owner
//! can no longer deliver. [`reconcile`] walks the book in order and:
//!
//! 1. Keeps only the alternatives the owner still holds a matching asset for
//!    (order preserved)
//! 2. Drops offers left with no alternatives
//! 3. Persists the book once, and only if step 1 or 2 changed something
//!
//! Running it twice in a row is a no-op the second time.

use tracing::{debug, warn};

use crate::engine::matcher::{first_match, matches};
use crate::error::EngineResult;
use crate::ledger::{KeyValueLedger, LedgerView, Transaction};
use crate::orderbook::OrderBook;
use crate::registry::AssetRegistry;
use crate::types::{Asset, Description};

/// Counters from one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Offers looked at
    pub offers_examined: usize,

    /// Alternatives removed from surviving or removed offers
    pub alternatives_pruned: usize,

    /// Offers dropped because no alternative was left
    pub offers_removed: usize,
}

impl SweepReport {
    /// Whether the sweep modified the book
    #[inline]
    pub fn changed(&self) -> bool {
        self.alternatives_pruned > 0 || self.offers_removed > 0
    }
}

/// Find the first asset in index order owned by `owner` that fits `description`
///
/// Index entries without a record are skipped.
pub fn find_satisfying_asset<V: LedgerView + ?Sized>(
    registry: &AssetRegistry,
    view: &V,
    owner: &str,
    description: &Description,
) -> EngineResult<Option<Asset>> {
    for id in registry.enumerate_ids() {
        match registry.lookup(view, id)? {
            Some(asset) if matches(&asset, owner, description) => {
                debug!(id, owner, wanted = %description, "satisfying asset found");
                return Ok(Some(asset));
            }
            Some(_) => {}
            None => warn!(id, "index entry has no asset record"),
        }
    }
    Ok(None)
}

/// Load every indexed asset once, in index order
fn load_assets<V: LedgerView + ?Sized>(
    registry: &AssetRegistry,
    view: &V,
) -> EngineResult<Vec<Asset>> {
    let mut assets = Vec::with_capacity(registry.len());
    for id in registry.enumerate_ids() {
        match registry.lookup(view, id)? {
            Some(asset) => assets.push(asset),
            None => warn!(id, "index entry has no asset record"),
        }
    }
    Ok(assets)
}

/// Prune unsatisfiable alternatives and drop dead offers
pub fn reconcile<L: KeyValueLedger + ?Sized>(
    registry: &AssetRegistry,
    book: &mut OrderBook,
    tx: &mut Transaction<'_, L>,
) -> EngineResult<SweepReport> {
    // Assets are not mutated during the sweep, so one pass over the index
    // serves every alternative.
    let assets = load_assets(registry, &*tx)?;
    let mut report = SweepReport::default();

    for offer in book.offers_mut().iter_mut() {
        report.offers_examined += 1;

        let before = offer.willing.len();
        offer
            .willing
            .retain(|alternative| first_match(&assets, &offer.owner, alternative).is_some());
        let pruned = before - offer.willing.len();

        if pruned > 0 {
            warn!(
                offer = %offer.id,
                owner = %offer.owner,
                pruned,
                remaining = offer.willing.len(),
                "pruned unsatisfiable alternatives"
            );
            report.alternatives_pruned += pruned;
        }
    }

    let before = book.len();
    book.offers_mut().retain(|offer| {
        if !offer.is_viable() {
            warn!(offer = %offer.id, owner = %offer.owner, "removed offer with no alternatives");
        }
        offer.is_viable()
    });
    report.offers_removed = before - book.len();

    if report.changed() {
        book.persist(tx)?;
    }
    debug!(
        examined = report.offers_examined,
        pruned = report.alternatives_pruned,
        removed = report.offers_removed,
        "sweep finished"
    );
    Ok(report)
}

// ============================================================================
// Unit Tests
// ============================================================================
