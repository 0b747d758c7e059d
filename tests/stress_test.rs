//! Stress tests for the barter engine.
//!
//! These tests verify:
//! 1. The asset index always lists exactly the live asset records
//! 2. After every sweeping invocation no offer promises an undeliverable asset
//! 3. Failed invocations leave the ledger untouched
//! 4. Determinism is preserved across runs
//!
//! ## Running Stress Tests
//!
//! ```bash
//! cargo test --release --test stress_test -- --nocapture
//! ```

use std::collections::BTreeSet;
use std::time::Instant;

use barter_ledger::engine::first_match;
use barter_ledger::ledger::Snapshot;
use barter_ledger::registry::{AssetRegistry, Removal};
use barter_ledger::{Asset, BarterEngine, Description, EngineError, MemoryLedger, OfferId};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Invocations per random run
const STRESS_OP_COUNT: usize = 1_500;

/// Live assets above which creation slows down
const TARGET_ASSETS: usize = 48;

const OWNERS: [&str; 4] = ["alice", "bob", "carol", "dave"];
const CATEGORIES: [&str; 3] = ["red", "blue", "green"];
const QUANTITIES: [u64; 2] = [8, 16];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn random_description(rng: &mut ChaCha8Rng) -> Description {
    Description::new(
        CATEGORIES[rng.gen_range(0..CATEGORIES.len())],
        QUANTITIES[rng.gen_range(0..QUANTITIES.len())],
    )
}

fn random_owner(rng: &mut ChaCha8Rng) -> &'static str {
    OWNERS[rng.gen_range(0..OWNERS.len())]
}

/// Index set must equal the set of non-reserved ledger keys, with no repeats
fn assert_index_integrity(engine: &BarterEngine<MemoryLedger>) {
    let ids = engine.asset_ids().unwrap();
    let indexed: BTreeSet<String> = ids.iter().cloned().collect();
    assert_eq!(indexed.len(), ids.len(), "index holds duplicate ids: {ids:?}");

    let config = engine.config();
    let records: BTreeSet<String> = engine
        .ledger()
        .snapshot()
        .into_keys()
        .filter(|key| !config.is_reserved_key(key))
        .collect();
    assert_eq!(indexed, records, "index and records diverged");
}

/// Every open alternative has a satisfying asset
fn assert_book_satisfiable(engine: &BarterEngine<MemoryLedger>) {
    let view = Snapshot::new(engine.ledger());
    let registry = AssetRegistry::load(&view, engine.config()).unwrap();
    let assets: Vec<Asset> = registry
        .enumerate_ids()
        .map(|id| registry.lookup(&view, id).unwrap().unwrap())
        .collect();

    for offer in engine.open_offers().unwrap() {
        assert!(offer.is_viable(), "offer {} has no alternatives", offer.id);
        for alternative in &offer.willing {
            assert!(
                first_match(&assets, &offer.owner, alternative).is_some(),
                "offer {} promises {alternative} that {} cannot deliver",
                offer.id,
                offer.owner
            );
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    created: usize,
    deleted: usize,
    reassigned: usize,
    opened: usize,
    withdrawn: usize,
    settled: usize,
    rejected: usize,
}

/// Run a seeded random sequence of invocations, checking invariants as it goes
fn run_random_sequence(seed: u64, count: usize) -> (BarterEngine<MemoryLedger>, RunStats) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut engine = BarterEngine::new(MemoryLedger::with_capacity(TARGET_ASSETS * 2));
    engine.init().unwrap();

    let mut stats = RunStats::default();
    let mut next_asset = 0u64;
    let mut now_ms = 1_000u64;

    for _ in 0..count {
        // Clock jitters, sometimes stepping backwards
        now_ms = now_ms.saturating_add(rng.gen_range(0..3)).saturating_sub(rng.gen_range(0..2));
        let before = engine.ledger().state_root();
        let live = engine.asset_ids().unwrap();

        let roll = rng.gen_range(0..100);
        let (result, sweeps): (Result<(), EngineError>, bool) = if roll < 30 {
            let create = live.len() < TARGET_ASSETS || rng.gen_bool(0.2);
            let asset = if create || live.is_empty() {
                next_asset += 1;
                Asset::new(
                    format!("A{next_asset}"),
                    random_owner(&mut rng),
                    CATEGORIES[rng.gen_range(0..CATEGORIES.len())],
                    QUANTITIES[rng.gen_range(0..QUANTITIES.len())],
                )
            } else {
                // Duplicate id
                Asset::new(live[rng.gen_range(0..live.len())].clone(), "zed", "red", 1)
            };
            let result = engine.create_asset(asset).map(|_| stats.created += 1);
            (result, true)
        } else if roll < 45 {
            let id = if live.is_empty() || rng.gen_bool(0.1) {
                "ghost".to_string()
            } else {
                live[rng.gen_range(0..live.len())].clone()
            };
            let result = engine.delete_asset(&id).map(|outcome| {
                if matches!(outcome.value, Removal::Removed(_)) {
                    stats.deleted += 1;
                }
            });
            (result, true)
        } else if roll < 55 && !live.is_empty() {
            let id = live[rng.gen_range(0..live.len())].clone();
            let result = engine
                .set_owner(&id, random_owner(&mut rng))
                .map(|_| stats.reassigned += 1);
            (result, true)
        } else if roll < 75 {
            let owner = random_owner(&mut rng);
            let wanted = random_description(&mut rng);
            let willing = (0..rng.gen_range(1..=3))
                .map(|_| random_description(&mut rng))
                .collect();
            let result = engine
                .open_trade(owner, wanted, willing, now_ms)
                .map(|_| stats.opened += 1);
            (result, false)
        } else if roll < 82 {
            let offers = engine.open_offers().unwrap();
            let id = match offers.len() {
                0 => "1".to_string(),
                n => offers[rng.gen_range(0..n)].id.to_string(),
            };
            let result = engine.remove_trade(&id).map(|_| stats.withdrawn += 1);
            (result, false)
        } else {
            let offers = engine.open_offers().unwrap();
            let (offer_id, alternatives) = match offers.len() {
                0 => (OfferId(0), 1),
                n => {
                    let offer = &offers[rng.gen_range(0..n)];
                    (offer.id, offer.willing.len())
                }
            };
            let closer = random_owner(&mut rng);
            let asset_id = match live.len() {
                0 => "ghost".to_string(),
                n => live[rng.gen_range(0..n)].clone(),
            };
            let index = rng.gen_range(0..=alternatives);
            let result = engine
                .perform_trade(offer_id, closer, &asset_id, index)
                .map(|_| stats.settled += 1);
            (result, true)
        };

        match result {
            Ok(()) => {
                if sweeps {
                    assert_book_satisfiable(&engine);
                }
            }
            Err(err) => {
                assert!(
                    !matches!(err, EngineError::StorageUnavailable(_) | EngineError::Codec(_)),
                    "unexpected failure: {err}"
                );
                assert_eq!(engine.ledger().state_root(), before, "failed invocation wrote: {err}");
                stats.rejected += 1;
            }
        }
        assert_index_integrity(&engine);
    }

    (engine, stats)
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Random invocation mix with invariant checks after every step.
#[test]
fn stress_random_invocations() {
    println!("\n=== STRESS TEST: {STRESS_OP_COUNT} random invocations ===\n");

    let start = Instant::now();
    let (mut engine, stats) = run_random_sequence(42, STRESS_OP_COUNT);
    let elapsed = start.elapsed();

    println!("  Created:           {:>8}", stats.created);
    println!("  Deleted:           {:>8}", stats.deleted);
    println!("  Reassigned:        {:>8}", stats.reassigned);
    println!("  Opened:            {:>8}", stats.opened);
    println!("  Withdrawn:         {:>8}", stats.withdrawn);
    println!("  Settled:           {:>8}", stats.settled);
    println!("  Rejected:          {:>8}", stats.rejected);
    println!("  Elapsed time:      {:>8.2?}", elapsed);
    println!("  State root:        {}", engine.ledger().state_root_hex());

    assert!(stats.created > 0);
    assert!(stats.opened > 0);
    assert!(stats.rejected > 0, "expected some invalid invocations");

    // A sweep now may prune offers opened since the last asset mutation,
    // but a second one must be a no-op.
    engine.reconcile().unwrap();
    assert_book_satisfiable(&engine);
    let second = engine.reconcile().unwrap();
    assert!(!second.value.changed());
    assert!(second.receipt.is_noop());

    println!("\n=== STRESS TEST PASSED ===\n");
}

/// Same seed, same final ledger.
#[test]
fn verify_determinism() {
    const TEST_COUNT: usize = 400;
    const SEED: u64 = 12345;

    let (first, _) = run_random_sequence(SEED, TEST_COUNT);
    let (second, _) = run_random_sequence(SEED, TEST_COUNT);
    assert_eq!(
        first.ledger().state_root(),
        second.ledger().state_root(),
        "state roots must match for determinism"
    );

    let (other, _) = run_random_sequence(SEED + 1, TEST_COUNT);
    assert_ne!(
        first.ledger().state_root(),
        other.ledger().state_root(),
        "different seeds should produce different ledgers"
    );
}

/// Re-initialising after a random run leaves no record behind the index.
#[test]
fn init_after_random_run_keeps_index_integrity() {
    let (mut engine, _) = run_random_sequence(99, 300);
    let live = engine.asset_ids().unwrap();
    assert!(!live.is_empty());

    engine.init().unwrap();
    assert_index_integrity(&engine);
    assert!(engine.ledger().snapshot().keys().all(|key| engine.config().is_reserved_key(key)));
    assert!(engine.open_offers().unwrap().is_empty());

    // Former ids are free again
    engine
        .create_asset(Asset::new(live[0].clone(), "alice", "red", 8))
        .unwrap();
    assert_index_integrity(&engine);
}

/// Offer ids stay strictly increasing under a jittery clock.
#[test]
fn stress_offer_ids_monotonic() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut engine = BarterEngine::new(MemoryLedger::new());
    engine.init().unwrap();

    let mut now_ms = 10_000u64;
    let mut last = None;
    for _ in 0..500 {
        now_ms = now_ms + rng.gen_range(0..2) - rng.gen_range(0..2);
        let id = engine
            .open_trade("alice", Description::new("blue", 16), vec![Description::new("red", 16)], now_ms)
            .unwrap()
            .value;
        if let Some(prev) = last {
            assert!(id > prev, "{id} not after {prev}");
        }
        last = Some(id);
    }
    assert_eq!(engine.open_offers().unwrap().len(), 500);
}
