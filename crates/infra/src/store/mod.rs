//! Data-store boundary for the loan core.
//!
//! The core sees the store only through a serializable unit of work spanning
//! items, request lines, loan batches and accounts.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryLoanStore, Table};
pub use r#trait::{LoanStore, UnitOfWork};
