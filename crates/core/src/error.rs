//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only (validation, ownership, state-machine
/// and stock rules). Store failures are modelled in the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced item, transaction, detail or account is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Role or ownership precondition failed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested status edge is not part of the lifecycle.
    #[error("invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// A reservation or availability check exceeded the item's stock.
    #[error("not enough stock for item '{item}': requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    /// Structurally disallowed operation (e.g. deleting a loaned detail).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A loan was submitted without any draft transactions.
    #[error("no draft transactions to submit")]
    EmptyCart,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_transition(from: impl core::fmt::Display, to: impl core::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn insufficient_stock(item: impl Into<String>, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            item: item.into(),
            requested,
            available,
        }
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}
