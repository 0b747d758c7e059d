//! Description matching predicate.

use crate::types::{Asset, Description};

/// Whether `asset` belongs to `owner` and fits `description`
///
/// Owner and category compare ASCII case-insensitively; quantity must be
/// exactly equal. Pure: no ledger access.
///
/// ```
/// use barter_ledger::engine::matches;
/// use barter_ledger::types::{Asset, Description};
///
/// let asset = Asset::new("A1", "Bob", "Blue", 16);
/// assert!(matches(&asset, "bob", &Description::new("blue", 16)));
/// assert!(!matches(&asset, "bob", &Description::new("blue", 15)));
/// assert!(!matches(&asset, "alice", &Description::new("blue", 16)));
/// ```
#[inline]
pub fn matches(asset: &Asset, owner: &str, description: &Description) -> bool {
    asset.quantity == description.quantity
        && asset.is_owned_by(owner)
        && asset.category.eq_ignore_ascii_case(&description.category)
}

/// First asset in `assets` that matches, in slice order
pub fn first_match<'a>(
    assets: &'a [Asset],
    owner: &str,
    description: &Description,
) -> Option<&'a Asset> {
    assets
        .iter()
        .find(|asset| matches(asset, owner, description))
}
