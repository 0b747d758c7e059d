//! Barter Ledger - demo binary
//!
//! Runs the delete-then-sweep scenario against an in-memory ledger and logs
//! every invocation. Set `RUST_LOG=debug` to see per-item matching.

use barter_ledger::{dispatch, BarterEngine, EngineResult, MemoryLedger, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn asset(id: &str, owner: &str, category: &str, quantity: &str) -> Vec<String> {
    let mut args = vec![
        id.to_string(),
        owner.to_string(),
        category.to_string(),
        quantity.to_string(),
    ];
    // Slip block: codes and names blank, numeric fields zero
    for field in 0..30 {
        let numeric = matches!(field, 14..=16 | 23..=28);
        args.push(if numeric { "0" } else { "" }.to_string());
    }
    args
}

fn run() -> EngineResult<()> {
    let mut engine = BarterEngine::new(MemoryLedger::new());
    let now_ms = 1_703_577_600_000;

    dispatch::<_, &str>(&mut engine, "init", &[], now_ms)?;
    dispatch(&mut engine, "init_asset", &asset("A1", "bob", "blue", "16"), now_ms)?;
    dispatch(&mut engine, "init_asset", &asset("A2", "bob", "red", "16"), now_ms)?;

    let opened = dispatch(
        &mut engine,
        "open_trade",
        &["alice", "blue", "16", "red", "16"],
        now_ms,
    )?;
    if let Response::OfferOpened { id, .. } = opened {
        info!(offer = %id, open = engine.open_offers()?.len(), "alice is offering red for blue");
    }

    dispatch(&mut engine, "delete", &["A2"], now_ms)?;
    let swept = dispatch::<_, &str>(&mut engine, "reconcile", &[], now_ms)?;
    if let Response::Swept { report, .. } = swept {
        info!(
            examined = report.offers_examined,
            removed = report.offers_removed,
            "explicit sweep"
        );
    }

    info!(
        assets = ?engine.asset_ids()?,
        open = engine.open_offers()?.len(),
        state_root = %engine.ledger().state_root_hex(),
        "final state"
    );
    Ok(())
}
