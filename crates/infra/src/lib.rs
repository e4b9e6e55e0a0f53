//! Infrastructure layer: stores, configuration and the exposed loan operations.
//!
//! The domain crates decide what a state change means; this crate decides
//! where it is persisted and makes every exposed operation a single unit of
//! work against a [`store::LoanStore`].

pub mod accounts;
pub mod catalogue;
pub mod config;
pub mod detail_workflow;
pub mod dto;
pub mod error;
pub mod loan_orchestrator;
pub mod service;
pub mod stock_ledger;
pub mod store;
pub mod transaction_manager;

pub use config::{ConfigError, Settings};
pub use dto::{AccountDeletion, AccountPatch, DetailView, DraftPatch, ItemPatch};
pub use error::{LoanError, StoreError};
pub use service::LoanService;
pub use store::{InMemoryLoanStore, LoanStore, Table, UnitOfWork};
pub use transaction_manager::DraftOutcome;
