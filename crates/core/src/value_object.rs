//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; to
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A strictly positive number of units requested from an item.
///
/// Stock itself may be zero, but every request line asks for at least one unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(units: u32) -> DomainResult<Self> {
        if units == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        Ok(Self(units))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Quantity as a signed stock delta magnitude.
    pub fn units(self) -> i64 {
        i64::from(self.0)
    }

    /// Sum of two quantities (draft merge). Fails instead of wrapping.
    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::validation("quantity overflow"))
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(Quantity::new(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn merge_adds_units() {
        let q = Quantity::new(2).unwrap().checked_add(Quantity::new(3).unwrap()).unwrap();
        assert_eq!(q.get(), 5);
        assert_eq!(q.units(), 5);
    }

    #[test]
    fn merge_overflow_is_a_validation_error() {
        let big = Quantity::new(u32::MAX).unwrap();
        assert!(big.checked_add(Quantity::new(1).unwrap()).is_err());
    }

    #[test]
    fn deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        let q: Quantity = serde_json::from_str("7").unwrap();
        assert_eq!(q.get(), 7);
    }
}
