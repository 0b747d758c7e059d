//! Fixed-point amounts for slip money fields.
//!
//! Unit cost, unit price, line amounts and slip totals are stored as u64
//! scaled by 10^8, so every replica writes the same bytes for the same
//! amount. Text goes through `rust_decimal`; floats are never involved.
//!
//! ```
//! use barter_ledger::types::price::{format_amount, to_fixed};
//!
//! let amount = to_fixed("1250.5").unwrap();
//! assert_eq!(amount, 125_050_000_000);
//! assert_eq!(format_amount(amount), "1250.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Fractional digits kept by the fixed-point representation
pub const DECIMALS: u32 = 8;

/// Scaling factor: 10^8
pub const SCALE: u64 = 100_000_000;

/// Parse a slip amount into fixed-point
///
/// `None` for text that is not a decimal, is negative, carries more than
/// eight fractional digits or does not fit in u64. Amounts are never rounded.
///
/// ```
/// use barter_ledger::types::price::to_fixed;
///
/// assert_eq!(to_fixed("2400"), Some(240_000_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("0.000000001"), None);
/// ```
pub fn to_fixed(text: &str) -> Option<u64> {
    let amount = Decimal::from_str(text.trim()).ok()?;
    decimal_to_fixed(amount)
}

/// Fixed-point value of a `Decimal`, under the same rules as [`to_fixed`]
pub fn decimal_to_fixed(amount: Decimal) -> Option<u64> {
    if amount.is_sign_negative() || amount.normalize().scale() > DECIMALS {
        return None;
    }
    amount.checked_mul(Decimal::from(SCALE))?.to_u64()
}

/// `Decimal` view of a fixed-point amount
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(value), DECIMALS)
}

/// Shortest decimal text for a fixed-point amount
pub fn format_amount(value: u64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}
