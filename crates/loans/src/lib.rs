//! Loan lifecycle domain module.
//!
//! Request lines (`Transaction`), loan batches (`Detail`) and the accounts that
//! own them. Everything here is pure: state changes are validated and applied
//! in memory, and the infrastructure layer decides what to persist.

pub mod account;
pub mod dates;
pub mod detail;
pub mod transaction;

pub use account::Account;
pub use dates::LoanDates;
pub use detail::{Detail, DetailCode, DetailStatus, StatusTransition, StockEffect};
pub use transaction::{Transaction, TransactionStatus};
