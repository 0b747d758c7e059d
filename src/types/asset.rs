//! Asset records tracked by the registry.
//!
//! An asset is a retail slip line: a unique identifier, the owning party, the
//! two attributes barter offers match on (`category` and `quantity`), and the
//! descriptive slip block carried along unchanged.
//!
//! ## Money
//!
//! Monetary attributes use the fixed-point representation from
//! [`crate::types::price`] (u64 scaled by 10^8).

use crate::error::{EngineError, EngineResult};

// ============================================================================
// SlipDetails
// ============================================================================

/// Descriptive attributes of a slip line.
///
/// None of these take part in matching. They are validated only for
/// structure (numeric fields are numeric) when decoded from raw arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlipDetails {
    pub record_kind: String,
    pub customer_code: String,
    pub department_code: String,
    /// Order date, `YYYYMMDD`
    pub order_date: String,
    /// Delivery date, `YYYYMMDD`
    pub delivery_date: String,
    /// Scheduled delivery date, `YYYYMMDD`
    pub scheduled_delivery_date: String,
    pub division_code: String,
    pub store_code: String,
    pub store_name: String,
    pub inspection_store_code: String,
    pub inspection_store_name: String,
    pub slip_number: String,
    pub slip_kind: String,
    pub shipment_class: String,
    /// Slip total quantity
    pub total_quantity: u64,
    /// Slip total cost (fixed-point)
    pub total_cost: u64,
    /// Slip total sales (fixed-point)
    pub total_sales: u64,
    pub line_number: String,
    pub product_code: String,
    /// JAN/EAN barcode
    pub barcode: String,
    pub product_name: String,
    pub product_name_alt: String,
    pub unit_name: String,
    pub units_per_case: u64,
    pub case_count: u64,
    /// Unit cost (fixed-point)
    pub unit_cost: u64,
    /// Unit price (fixed-point)
    pub unit_price: u64,
    /// Line cost amount (fixed-point)
    pub cost_amount: u64,
    /// Line sales amount (fixed-point)
    pub sales_amount: u64,
    pub usage_class: String,
}

// ============================================================================
// Asset
// ============================================================================

/// A uniquely identified record in the registry.
///
/// ## Invariants
///
/// - `id` is non-empty and never changes once stored
/// - `id` is unique across live assets (enforced by the registry)
///
/// ## Example
///
/// ```
/// use barter_ledger::types::Asset;
///
/// let asset = Asset::new("A1", "bob", "blue", 16);
/// assert_eq!(asset.owner, "bob");
/// assert!(asset.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Asset {
    /// Unique identifier, also the asset's ledger key
    pub id: String,

    /// Owning party
    pub owner: String,

    /// Category attribute used for matching
    pub category: String,

    /// Quantity attribute used for matching
    pub quantity: u64,

    /// Descriptive slip block
    pub slip: SlipDetails,
}

impl Asset {
    /// Create an asset with an empty slip block
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        category: impl Into<String>,
        quantity: u64,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            category: category.into(),
            quantity,
            slip: SlipDetails::default(),
        }
    }

    /// Attach a slip block
    pub fn with_slip(mut self, slip: SlipDetails) -> Self {
        self.slip = slip;
        self
    }

    /// Structural checks applied before an asset is stored
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.is_empty() {
            return Err(EngineError::invalid("asset id must be a non-empty string"));
        }
        if self.owner.is_empty() {
            return Err(EngineError::invalid("asset owner must be a non-empty string"));
        }
        Ok(())
    }

    /// Whether `party` owns this asset (case-insensitive)
    #[inline]
    pub fn is_owned_by(&self, party: &str) -> bool {
        self.owner.eq_ignore_ascii_case(party)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
