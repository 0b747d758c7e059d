//! Function-name dispatch over flat string arguments.
//!
//! Hosts that invoke the engine with a function name and a list of strings
//! go through [`dispatch`]. Arguments are positional:
//!
//! | function | arguments |
//! |----------|-----------|
//! | `init` | none |
//! | `init_asset` | 34 asset fields in declaration order |
//! | `delete` | `id` |
//! | `set_owner` | `id`, `owner` |
//! | `open_trade` | `owner`, `category`, `quantity`, then one or more `category`, `quantity` pairs |
//! | `remove_trade` | `offer_id` |
//! | `perform_trade` | `offer_id`, `closer`, `closer_asset_id`, `alternative_index` |
//! | `reconcile` | none |
//! | `read` | `key` |
//!
//! Money fields of `init_asset` are decimal strings converted to fixed-point
//! with [`crate::types::price::to_fixed`].

use tracing::debug;

use crate::engine::{BarterEngine, Settlement, SweepReport};
use crate::error::{EngineError, EngineResult};
use crate::ledger::KeyValueLedger;
use crate::types::{price, Asset, Description, InvocationReceipt, OfferId, SlipDetails};

/// Number of positional arguments taken by `init_asset`
pub const ASSET_ARG_COUNT: usize = 34;

/// Result of a dispatched call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A mutation committed with nothing else to report
    Committed(InvocationReceipt),

    /// `open_trade` succeeded
    OfferOpened {
        id: OfferId,
        receipt: InvocationReceipt,
    },

    /// `perform_trade` succeeded
    Settled {
        settlement: Box<Settlement>,
        receipt: InvocationReceipt,
    },

    /// `reconcile` finished
    Swept {
        report: SweepReport,
        receipt: InvocationReceipt,
    },

    /// `read` result
    Value(Option<Vec<u8>>),
}

impl Response {
    /// Bytes handed back to the host
    ///
    /// The new offer id as decimal text for `open_trade`, the raw value for
    /// `read`, empty otherwise.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Response::OfferOpened { id, .. } => id.to_string().into_bytes(),
            Response::Value(value) => value.clone().unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Receipt of the committed invocation, if this was a mutation
    pub fn receipt(&self) -> Option<&InvocationReceipt> {
        match self {
            Response::Committed(receipt)
            | Response::OfferOpened { receipt, .. }
            | Response::Settled { receipt, .. }
            | Response::Swept { receipt, .. } => Some(receipt),
            Response::Value(_) => None,
        }
    }
}

/// Route `function` with positional `args` to the engine
pub fn dispatch<L, S>(
    engine: &mut BarterEngine<L>,
    function: &str,
    args: &[S],
    now_ms: u64,
) -> EngineResult<Response>
where
    L: KeyValueLedger,
    S: AsRef<str>,
{
    let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
    debug!(function, args = args.len(), "dispatch");

    match function {
        "init" => {
            arity(function, &args, 0)?;
            Ok(Response::Committed(engine.init()?))
        }
        "init_asset" => {
            arity(function, &args, ASSET_ARG_COUNT)?;
            let asset = parse_asset(&args)?;
            Ok(Response::Committed(engine.create_asset(asset)?))
        }
        "delete" => {
            arity(function, &args, 1)?;
            let id = required("id", args[0])?;
            Ok(Response::Committed(engine.delete_asset(id)?.receipt))
        }
        "set_owner" => {
            arity(function, &args, 2)?;
            let id = required("id", args[0])?;
            let owner = required("owner", args[1])?;
            Ok(Response::Committed(engine.set_owner(id, owner)?.receipt))
        }
        "open_trade" => {
            if args.len() < 5 || args.len() % 2 == 0 {
                return Err(EngineError::invalid(format!(
                    "open_trade takes owner, wanted category and quantity, then category/quantity pairs; got {} arguments",
                    args.len()
                )));
            }
            let owner = required("owner", args[0])?;
            let wanted = parse_description(args[1], args[2])?;
            let willing = args[3..]
                .chunks(2)
                .map(|pair| parse_description(pair[0], pair[1]))
                .collect::<EngineResult<Vec<_>>>()?;

            let outcome = engine.open_trade(owner, wanted, willing, now_ms)?;
            Ok(Response::OfferOpened {
                id: outcome.value,
                receipt: outcome.receipt,
            })
        }
        "remove_trade" => {
            arity(function, &args, 1)?;
            Ok(Response::Committed(engine.remove_trade(args[0])?.receipt))
        }
        "perform_trade" => {
            arity(function, &args, 4)?;
            let offer_id: OfferId = args[0].parse()?;
            let closer = required("closer", args[1])?;
            let asset_id = required("closer_asset_id", args[2])?;
            let index = parse_u64("alternative_index", args[3])?;
            let index = usize::try_from(index)
                .map_err(|_| EngineError::invalid("alternative_index out of range"))?;

            let outcome = engine.perform_trade(offer_id, closer, asset_id, index)?;
            Ok(Response::Settled {
                settlement: Box::new(outcome.value),
                receipt: outcome.receipt,
            })
        }
        "reconcile" => {
            arity(function, &args, 0)?;
            let outcome = engine.reconcile()?;
            Ok(Response::Swept {
                report: outcome.value,
                receipt: outcome.receipt,
            })
        }
        "read" => {
            arity(function, &args, 1)?;
            let key = required("key", args[0])?;
            Ok(Response::Value(engine.read(key)?))
        }
        other => Err(EngineError::invalid(format!("unknown function {other:?}"))),
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

fn arity(function: &str, args: &[&str], expected: usize) -> EngineResult<()> {
    if args.len() != expected {
        return Err(EngineError::invalid(format!(
            "{function} takes {expected} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn required<'a>(field: &str, value: &'a str) -> EngineResult<&'a str> {
    if value.is_empty() {
        return Err(EngineError::invalid(format!("{field} must be a non-empty string")));
    }
    Ok(value)
}

fn parse_u64(field: &str, value: &str) -> EngineResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| EngineError::invalid(format!("{field} must be a numeric string: {value:?}")))
}

fn parse_money(field: &str, value: &str) -> EngineResult<u64> {
    price::to_fixed(value)
        .ok_or_else(|| EngineError::invalid(format!("{field} must be a decimal amount: {value:?}")))
}

fn parse_description(category: &str, quantity: &str) -> EngineResult<Description> {
    let description = Description::new(category, parse_u64("quantity", quantity)?);
    description.validate()?;
    Ok(description)
}

/// Build an asset from the positional fields
fn parse_asset(args: &[&str]) -> EngineResult<Asset> {
    let text = |i: usize| args[i].to_string();

    let slip = SlipDetails {
        record_kind: text(4),
        customer_code: text(5),
        department_code: text(6),
        order_date: text(7),
        delivery_date: text(8),
        scheduled_delivery_date: text(9),
        division_code: text(10),
        store_code: text(11),
        store_name: text(12),
        inspection_store_code: text(13),
        inspection_store_name: text(14),
        slip_number: text(15),
        slip_kind: text(16),
        shipment_class: text(17),
        total_quantity: parse_u64("total_quantity", args[18])?,
        total_cost: parse_money("total_cost", args[19])?,
        total_sales: parse_money("total_sales", args[20])?,
        line_number: text(21),
        product_code: text(22),
        barcode: text(23),
        product_name: text(24),
        product_name_alt: text(25),
        unit_name: text(26),
        units_per_case: parse_u64("units_per_case", args[27])?,
        case_count: parse_u64("case_count", args[28])?,
        unit_cost: parse_money("unit_cost", args[29])?,
        unit_price: parse_money("unit_price", args[30])?,
        cost_amount: parse_money("cost_amount", args[31])?,
        sales_amount: parse_money("sales_amount", args[32])?,
        usage_class: text(33),
    };

    let asset = Asset::new(
        required("id", args[0])?,
        required("owner", args[1])?,
        args[2],
        parse_u64("quantity", args[3])?,
    )
    .with_slip(slip);
    asset.validate()?;
    Ok(asset)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn engine() -> BarterEngine<MemoryLedger> {
        let mut engine = BarterEngine::new(MemoryLedger::new());
        dispatch::<_, &str>(&mut engine, "init", &[], 0).unwrap();
        engine
    }

    fn asset_args(id: &str, owner: &str, category: &str, quantity: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![id.into(), owner.into(), category.into(), quantity.into()];
        args.extend(
            [
                "D", "C001", "12", "20231201", "20231203", "20231203", "01", "S01", "Ginza",
                "S02", "Shibuya", "SL-9", "10", "1", "48", "1200.50", "2400", "1", "P-1",
                "4901234567894", "Cola", "Cola 500ml", "btl", "24", "2", "25.01", "50",
                "1200.50", "2400", "0",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }

    #[test]
    fn test_init_asset() {
        let mut engine = engine();
        let args = asset_args("A1", "bob", "blue", "16");
        assert_eq!(args.len(), ASSET_ARG_COUNT);

        dispatch(&mut engine, "init_asset", &args, 0).unwrap();
        let asset = engine.lookup_asset("A1").unwrap().unwrap();
        assert_eq!(asset.quantity, 16);
        assert_eq!(asset.slip.store_name, "Ginza");
        assert_eq!(asset.slip.total_cost, 120_050_000_000);
        assert_eq!(asset.slip.unit_cost, 2_501_000_000);
        assert_eq!(asset.slip.units_per_case, 24);
        assert_eq!(asset.slip.usage_class, "0");
    }

    #[test]
    fn test_init_asset_rejects_bad_numbers() {
        let mut engine = engine();
        let mut args = asset_args("A1", "bob", "blue", "sixteen");
        assert!(matches!(
            dispatch(&mut engine, "init_asset", &args, 0),
            Err(EngineError::InvalidArgument(_))
        ));

        args[3] = "16".into();
        args[29] = "12.3.4".into();
        assert!(matches!(
            dispatch(&mut engine, "init_asset", &args, 0),
            Err(EngineError::InvalidArgument(_))
        ));

        args.pop();
        assert!(matches!(
            dispatch(&mut engine, "init_asset", &args, 0),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(engine.asset_ids().unwrap().is_empty());
    }

    #[test]
    fn test_open_trade_returns_id() {
        let mut engine = engine();
        let response = dispatch(
            &mut engine,
            "open_trade",
            &["alice", "blue", "16", "red", "16", "green", "4"],
            1_703_577_600_000,
        )
        .unwrap();

        assert_eq!(response.payload(), b"1703577600000".to_vec());
        let offers = engine.open_offers().unwrap();
        assert_eq!(offers[0].willing.len(), 2);
    }

    #[test]
    fn test_open_trade_arity() {
        let mut engine = engine();
        for args in [
            vec!["alice", "blue", "16"],
            vec!["alice", "blue", "16", "red"],
            vec!["alice", "blue", "16", "red", "16", "green"],
        ] {
            assert!(matches!(
                dispatch(&mut engine, "open_trade", &args, 1),
                Err(EngineError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_trade_round() {
        let mut engine = engine();
        dispatch(&mut engine, "init_asset", &asset_args("A1", "bob", "blue", "16"), 0).unwrap();
        dispatch(&mut engine, "init_asset", &asset_args("A2", "alice", "red", "16"), 0).unwrap();
        let opened = dispatch(&mut engine, "open_trade", &["alice", "blue", "16", "red", "16"], 5)
            .unwrap();
        let id = String::from_utf8(opened.payload()).unwrap();

        let settled =
            dispatch(&mut engine, "perform_trade", &[id.as_str(), "bob", "A1", "0"], 6).unwrap();
        assert!(matches!(settled, Response::Settled { .. }));
        assert_eq!(engine.lookup_asset("A1").unwrap().unwrap().owner, "alice");

        let swept = dispatch::<_, &str>(&mut engine, "reconcile", &[], 7).unwrap();
        assert!(swept.receipt().unwrap().is_noop());
    }

    #[test]
    fn test_read_and_unknown() {
        let mut engine = engine();
        let value = dispatch(&mut engine, "read", &["_assetindex"], 0).unwrap();
        assert!(matches!(value, Response::Value(Some(_))));
        assert!(value.receipt().is_none());

        assert!(matches!(
            dispatch::<_, &str>(&mut engine, "transfer", &[], 0),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            dispatch(&mut engine, "write", &["_assetindex", "junk"], 0),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            dispatch(&mut engine, "remove_trade", &["x1"], 0),
            Err(EngineError::InvalidArgument(_))
        ));
        let deleted = dispatch(&mut engine, "delete", &["ghost"], 0).unwrap();
        assert!(deleted.receipt().unwrap().is_noop());
    }
}
