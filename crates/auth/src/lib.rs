//! `loantrack-auth`: caller identity and role checks for the loan core.
//!
//! Authentication happens upstream; this crate only models the resolved
//! caller and the pure policy checks the core enforces.

pub mod authorize;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, ensure_owner_or_approver, require_role};
pub use principal::CallerIdentity;
pub use roles::Role;
