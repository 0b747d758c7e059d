//! Open barter offers.
//!
//! ## Identifiers
//!
//! An offer id is a creation timestamp in milliseconds, made strictly
//! monotonic by the lifecycle: when two offers are opened within the same
//! clock tick (or the clock steps backwards) the later offer gets
//! `last_issued + 1`. Ids therefore still sort by creation order.

use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::types::Description;

// ============================================================================
// OfferId
// ============================================================================

/// Identifier of an open offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OfferId(pub u64);

impl OfferId {
    /// Next id given the current clock and the last id handed out
    ///
    /// Fails with `InvalidArgument` once `u64::MAX` has been issued.
    ///
    /// ```
    /// use barter_ledger::types::OfferId;
    ///
    /// assert_eq!(OfferId::next(1_000, None).unwrap(), OfferId(1_000));
    /// assert_eq!(OfferId::next(1_000, Some(OfferId(1_000))).unwrap(), OfferId(1_001));
    /// assert_eq!(OfferId::next(900, Some(OfferId(1_000))).unwrap(), OfferId(1_001));
    /// ```
    pub fn next(now_ms: u64, last: Option<OfferId>) -> EngineResult<OfferId> {
        match last {
            Some(OfferId(prev)) if now_ms <= prev => prev
                .checked_add(1)
                .map(OfferId)
                .ok_or_else(|| EngineError::invalid("offer id space exhausted")),
            _ => Ok(OfferId(now_ms)),
        }
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OfferId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(OfferId)
            .map_err(|_| EngineError::invalid(format!("offer id must be a numeric string: {s:?}")))
    }
}

// ============================================================================
// TradeOffer
// ============================================================================

/// One open barter order.
///
/// `willing` lists the alternatives the owner will give up, in the owner's
/// order of preference. An offer whose `willing` list is empty is not a
/// valid steady state; the consistency sweep removes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TradeOffer {
    /// Offer identifier
    pub id: OfferId,

    /// Party that opened the offer
    pub owner: String,

    /// Creation timestamp in milliseconds (clock value, before id bumping)
    pub created_at: u64,

    /// Description of the asset wanted in exchange
    pub wanted: Description,

    /// Alternatives the owner is willing to give up
    pub willing: Vec<Description>,
}

impl TradeOffer {
    pub fn new(
        id: OfferId,
        owner: impl Into<String>,
        created_at: u64,
        wanted: Description,
        willing: Vec<Description>,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            created_at,
            wanted,
            willing,
        }
    }

    /// Whether the offer still has at least one alternative
    #[inline]
    pub fn is_viable(&self) -> bool {
        !self.willing.is_empty()
    }

    /// Get an alternative by position
    #[inline]
    pub fn alternative(&self, index: usize) -> Option<&Description> {
        self.willing.get(index)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
