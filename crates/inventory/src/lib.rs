//! Inventory domain module.
//!
//! Business rules for item stock, implemented as deterministic domain logic
//! (no IO, no storage). The infrastructure Stock Ledger is the only caller
//! that persists the results.

pub mod item;

pub use item::Item;
