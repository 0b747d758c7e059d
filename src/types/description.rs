//! Partial asset match patterns.

use crate::error::{EngineError, EngineResult};

/// The attribute tuple an offer wants or is willing to give away.
///
/// The owner half of the pattern is not stored here: it is carried by the
/// offer (for willing alternatives) or by the closing party (for the wanted
/// side of a trade).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Description {
    /// Category to match (case-insensitive)
    pub category: String,

    /// Quantity to match exactly
    pub quantity: u64,
}

impl Description {
    pub fn new(category: impl Into<String>, quantity: u64) -> Self {
        Self {
            category: category.into(),
            quantity,
        }
    }

    /// A description is fully specified when its category is non-empty
    pub fn validate(&self) -> EngineResult<()> {
        if self.category.is_empty() {
            return Err(EngineError::invalid(
                "description category must be a non-empty string",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.category, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Description::new("red", 16).validate().is_ok());
        assert!(Description::new("", 16).validate().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Description::new("red", 16).to_string(), "redx16");
    }
}
