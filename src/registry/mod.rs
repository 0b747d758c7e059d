//! Asset registry: asset records plus the identifier index.
//!
//! ## Storage
//!
//! - One ledger key per asset id holding the encoded [`Asset`]
//! - One well-known key holding the [`AssetIndex`]
//!
//! The ledger has no scan, so the index is the only way to enumerate assets.
//! Every mutation here updates the record and the index inside the same
//! [`Transaction`], keeping the index identifier set equal to the set of
//! live records.
//!
//! ## Example
//!
//! ```
//! use barter_ledger::ledger::{MemoryLedger, Transaction};
//! use barter_ledger::registry::AssetRegistry;
//! use barter_ledger::types::Asset;
//! use barter_ledger::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let mut ledger = MemoryLedger::new();
//! let mut tx = Transaction::begin(&mut ledger);
//!
//! let mut registry = AssetRegistry::load(&tx, &config).unwrap();
//! registry.create(&mut tx, Asset::new("A1", "bob", "blue", 16)).unwrap();
//!
//! assert_eq!(registry.enumerate_ids().collect::<Vec<_>>(), vec!["A1"]);
//! assert!(registry.lookup(&tx, "A1").unwrap().is_some());
//! ```

mod index;

pub use index::AssetIndex;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{codec, KeyValueLedger, LedgerView, Transaction};
use crate::types::Asset;

/// Outcome of [`AssetRegistry::delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The record existed and was removed along with its index entry
    Removed(Asset),
    /// No record existed, but a dangling index entry was dropped
    Repaired,
    /// Neither a record nor an index entry existed; nothing was written
    Absent,
}

/// In-memory view of the registry for one invocation
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    config: EngineConfig,
    index: AssetIndex,
}

impl AssetRegistry {
    /// Load the index; an absent index key is an empty registry
    pub fn load<V: LedgerView + ?Sized>(view: &V, config: &EngineConfig) -> EngineResult<Self> {
        let index = match view.read(&config.index_key)? {
            Some(bytes) => AssetIndex::from(codec::decode_index(&config.index_key, &bytes)?),
            None => AssetIndex::new(),
        };
        debug!(assets = index.len(), "asset index loaded");

        Ok(Self {
            config: config.clone(),
            index,
        })
    }

    /// An empty registry (used by `init`)
    pub fn empty(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            index: AssetIndex::new(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Load an asset by id; no side effects
    pub fn lookup<V: LedgerView + ?Sized>(
        &self,
        view: &V,
        id: &str,
    ) -> EngineResult<Option<Asset>> {
        if id.is_empty() || self.config.is_reserved_key(id) {
            return Ok(None);
        }
        match view.read(id)? {
            Some(bytes) => Ok(Some(codec::decode_asset(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// All indexed ids in index order
    ///
    /// The iterator borrows the in-memory index: it is finite, and calling
    /// this again restarts from the first id.
    pub fn enumerate_ids(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.index.iter()
    }

    #[inline]
    pub fn index(&self) -> &AssetIndex {
        &self.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Store a new asset and index it
    ///
    /// The duplicate check reads the record itself, not the index, so a
    /// stale index entry can neither hide a live record nor block a create.
    pub fn create<L: KeyValueLedger + ?Sized>(
        &mut self,
        tx: &mut Transaction<'_, L>,
        asset: Asset,
    ) -> EngineResult<()> {
        asset.validate()?;
        if self.config.is_reserved_key(&asset.id) {
            return Err(EngineError::invalid(format!(
                "asset id {:?} collides with a reserved ledger key",
                asset.id
            )));
        }
        if self.lookup(&*tx, &asset.id)?.is_some() {
            warn!(id = %asset.id, "asset already exists");
            return Err(EngineError::DuplicateAsset { id: asset.id });
        }

        let bytes = codec::encode_asset(&asset).map_err(EngineError::from_encode)?;
        tx.put(&asset.id, bytes);

        if self.index.push_unique(&asset.id) {
            self.persist_index(tx)?;
        } else {
            warn!(id = %asset.id, "index already listed id without a record");
        }

        info!(id = %asset.id, owner = %asset.owner, assets = self.index.len(), "asset created");
        Ok(())
    }

    /// Remove an asset's record and its index entry
    ///
    /// Deleting an unknown id succeeds as [`Removal::Absent`] without writing.
    /// The caller runs the consistency sweep afterwards.
    pub fn delete<L: KeyValueLedger + ?Sized>(
        &mut self,
        tx: &mut Transaction<'_, L>,
        id: &str,
    ) -> EngineResult<Removal> {
        let record = self.lookup(&*tx, id)?;
        let unindexed = self.index.remove_first(id);

        match (record, unindexed) {
            (None, None) => {
                debug!(id, "delete of unknown asset is a no-op");
                Ok(Removal::Absent)
            }
            (None, Some(position)) => {
                warn!(id, position, "dropped dangling index entry");
                self.persist_index(tx)?;
                Ok(Removal::Repaired)
            }
            (Some(asset), position) => {
                tx.delete(id);
                if position.is_some() {
                    self.persist_index(tx)?;
                } else {
                    warn!(id, "deleted asset that was missing from the index");
                }
                info!(id, assets = self.index.len(), "asset deleted");
                Ok(Removal::Removed(asset))
            }
        }
    }

    /// Rewrite an existing asset record in place
    ///
    /// The id is immutable, so the index is untouched.
    pub fn update<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
        asset: &Asset,
    ) -> EngineResult<()> {
        if self.lookup(&*tx, &asset.id)?.is_none() {
            return Err(EngineError::NotFound {
                id: asset.id.clone(),
            });
        }
        let bytes = codec::encode_asset(asset).map_err(EngineError::from_encode)?;
        tx.put(&asset.id, bytes);
        Ok(())
    }

    /// Reassign an asset to `owner`, returning the updated asset
    pub fn set_owner<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
        id: &str,
        owner: &str,
    ) -> EngineResult<Asset> {
        if owner.is_empty() {
            return Err(EngineError::invalid("owner must be a non-empty string"));
        }
        let mut asset = self
            .lookup(&*tx, id)?
            .ok_or_else(|| EngineError::NotFound { id: id.to_string() })?;

        debug!(id, from = %asset.owner, to = owner, "owner changed");
        asset.owner = owner.to_string();
        self.update(tx, &asset)?;
        Ok(asset)
    }

    /// Write the index back
    pub fn persist_index<L: KeyValueLedger + ?Sized>(
        &self,
        tx: &mut Transaction<'_, L>,
    ) -> EngineResult<()> {
        let bytes = codec::encode_index(self.index.as_slice()).map_err(EngineError::from_encode)?;
        tx.put(&self.config.index_key, bytes);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn ids(registry: &AssetRegistry) -> Vec<&str> {
        registry.enumerate_ids().collect()
    }

    #[test]
    fn test_create_and_lookup() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();

        registry.create(&mut tx, Asset::new("A1", "bob", "blue", 16)).unwrap();
        registry.create(&mut tx, Asset::new("A2", "bob", "red", 16)).unwrap();

        assert_eq!(ids(&registry), vec!["A1", "A2"]);
        let a1 = registry.lookup(&tx, "A1").unwrap().unwrap();
        assert_eq!(a1.category, "blue");
        assert!(registry.lookup(&tx, "missing").unwrap().is_none());
    }

    #[test]
    fn test_create_duplicate() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();

        registry.create(&mut tx, Asset::new("A1", "bob", "blue", 16)).unwrap();
        let err = registry
            .create(&mut tx, Asset::new("A1", "carol", "green", 1))
            .unwrap_err();

        assert_eq!(err, EngineError::DuplicateAsset { id: "A1".into() });
        assert_eq!(ids(&registry), vec!["A1"]);
    }

    #[test]
    fn test_create_reserved_id() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();

        let err = registry
            .create(&mut tx, Asset::new("_opentrades", "bob", "blue", 1))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert!(!tx.is_dirty());
    }

    #[test]
    fn test_index_survives_reload() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        {
            let mut tx = Transaction::begin(&mut ledger);
            let mut registry = AssetRegistry::load(&tx, &config).unwrap();
            registry.create(&mut tx, Asset::new("A1", "bob", "blue", 1)).unwrap();
            registry.create(&mut tx, Asset::new("A2", "bob", "blue", 2)).unwrap();
            tx.commit().unwrap();
        }

        let tx = Transaction::begin(&mut ledger);
        let registry = AssetRegistry::load(&tx, &config).unwrap();
        assert_eq!(ids(&registry), vec!["A1", "A2"]);
    }

    #[test]
    fn test_delete_keeps_order() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();
        for id in ["A1", "A2", "A3", "A4"] {
            registry.create(&mut tx, Asset::new(id, "bob", "blue", 1)).unwrap();
        }

        let removal = registry.delete(&mut tx, "A2").unwrap();
        assert!(matches!(removal, Removal::Removed(ref a) if a.id == "A2"));
        assert_eq!(ids(&registry), vec!["A1", "A3", "A4"]);
        assert!(tx.get("A2").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();

        assert_eq!(registry.delete(&mut tx, "ghost").unwrap(), Removal::Absent);
        assert!(ids(&registry).is_empty());
        assert!(!tx.is_dirty());
    }

    #[test]
    fn test_delete_repairs_dangling_entry() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        // Index lists an id that has no record
        ledger
            .put(
                &config.index_key,
                codec::encode_index(&["A1".to_string(), "ghost".to_string()]).unwrap(),
            )
            .unwrap();

        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();
        assert_eq!(registry.delete(&mut tx, "ghost").unwrap(), Removal::Repaired);
        assert_eq!(ids(&registry), vec!["A1"]);
    }

    #[test]
    fn test_create_over_dangling_entry_does_not_duplicate() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        ledger
            .put(&config.index_key, codec::encode_index(&["A1".to_string()]).unwrap())
            .unwrap();

        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();
        registry.create(&mut tx, Asset::new("A1", "bob", "blue", 1)).unwrap();
        assert_eq!(ids(&registry), vec!["A1"]);
    }

    #[test]
    fn test_set_owner() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();
        registry.create(&mut tx, Asset::new("A1", "bob", "blue", 16)).unwrap();

        let updated = registry.set_owner(&mut tx, "A1", "alice").unwrap();
        assert_eq!(updated.owner, "alice");
        assert_eq!(registry.lookup(&tx, "A1").unwrap().unwrap().owner, "alice");

        assert!(matches!(
            registry.set_owner(&mut tx, "nope", "alice"),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            registry.set_owner(&mut tx, "A1", ""),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_enumerate_restartable() {
        let config = EngineConfig::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = Transaction::begin(&mut ledger);
        let mut registry = AssetRegistry::load(&tx, &config).unwrap();
        registry.create(&mut tx, Asset::new("A1", "bob", "blue", 1)).unwrap();
        registry.create(&mut tx, Asset::new("A2", "bob", "blue", 1)).unwrap();

        let iter = registry.enumerate_ids();
        let first: Vec<&str> = iter.clone().collect();
        let second: Vec<&str> = iter.collect();
        assert_eq!(first, second);
    }
}
