//! Error types surfaced by the loan core.

use thiserror::Error;

use loantrack_auth::AuthzError;
use loantrack_core::DomainError;

/// Data-store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key violated: {0}")]
    ForeignKey(String),

    #[error("row not found: {0}")]
    MissingRow(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Error returned by every exposed loan operation.
///
/// Domain failures are carried over variant by variant; store failures end up
/// in `Persistence` (or `AttachFailed` while binding drafts to a batch). When
/// any of these is returned the unit of work has been rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("not enough stock for item '{item}': requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("no draft transaction found for the current user")]
    EmptyCart,

    #[error("attaching drafts to detail failed: {0}")]
    AttachFailed(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl LoanError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            LoanError::Validation(_) => "validation_error",
            LoanError::NotFound(_) => "not_found",
            LoanError::Forbidden(_) => "forbidden",
            LoanError::InvalidTransition { .. } => "invalid_transition",
            LoanError::InsufficientStock { .. } => "insufficient_stock",
            LoanError::InvalidOperation(_) => "invalid_operation",
            LoanError::EmptyCart => "empty_cart",
            LoanError::AttachFailed(_) => "attach_failed",
            LoanError::Persistence(_) => "persistence_failure",
        }
    }
}

impl From<DomainError> for LoanError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LoanError::Validation(msg),
            DomainError::NotFound(what) => LoanError::NotFound(what),
            DomainError::Forbidden(msg) => LoanError::Forbidden(msg),
            DomainError::InvalidTransition { from, to } => {
                LoanError::InvalidTransition { from, to }
            }
            DomainError::InsufficientStock {
                item,
                requested,
                available,
            } => LoanError::InsufficientStock {
                item,
                requested,
                available,
            },
            DomainError::InvalidOperation(msg) => LoanError::InvalidOperation(msg),
            DomainError::EmptyCart => LoanError::EmptyCart,
        }
    }
}

impl From<AuthzError> for LoanError {
    fn from(value: AuthzError) -> Self {
        LoanError::Forbidden(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_keeps_quantities() {
        let err: LoanError = DomainError::insufficient_stock("widget", 5, 3).into();
        assert_eq!(
            err,
            LoanError::InsufficientStock {
                item: "widget".to_string(),
                requested: 5,
                available: 3,
            }
        );
        assert_eq!(err.code(), "insufficient_stock");
        assert_eq!(
            err.to_string(),
            "not enough stock for item 'widget': requested 5, available 3"
        );
    }

    #[test]
    fn store_errors_become_persistence_failures() {
        let err: LoanError = StoreError::WriteFailed("disk full".into()).into();
        assert_eq!(err.code(), "persistence_failure");
    }
}
