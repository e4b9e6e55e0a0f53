//! Entity trait: identity + continuity across state changes.

use crate::error::DomainError;

/// A persisted record with a stable identity (items, loan rows, accounts).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Human-readable kind used in error messages and log fields (`"item"`, `"detail"`, ...).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// `NotFound` error for an identifier of this entity kind.
    fn not_found(id: &Self::Id) -> DomainError {
        DomainError::not_found(format!("{} {}", Self::KIND, id))
    }
}
