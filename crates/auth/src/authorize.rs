use thiserror::Error;

use loantrack_core::{DomainError, UserId};

use crate::{CallerIdentity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("role '{required}' required, caller is '{actual}'")]
    RoleRequired { required: Role, actual: Role },

    #[error("caller does not own this {0}")]
    NotOwner(&'static str),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::forbidden(value.to_string())
    }
}

/// Require the caller to hold exactly `required`.
///
/// - No IO
/// - No panics
pub fn require_role(caller: &CallerIdentity, required: Role) -> Result<(), AuthzError> {
    if caller.role == required {
        Ok(())
    } else {
        Err(AuthzError::RoleRequired {
            required,
            actual: caller.role,
        })
    }
}

/// Approvers may act on any record; requesters only on records they own.
///
/// `what` names the record kind for the error message.
pub fn ensure_owner_or_approver(
    caller: &CallerIdentity,
    owner: UserId,
    what: &'static str,
) -> Result<(), AuthzError> {
    if caller.is_approver() || caller.user_id == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_role_rejects_other_roles() {
        let caller = CallerIdentity::requester(UserId::new());
        assert_eq!(
            require_role(&caller, Role::Approver),
            Err(AuthzError::RoleRequired {
                required: Role::Approver,
                actual: Role::Requester,
            })
        );
        assert!(require_role(&caller, Role::Requester).is_ok());
    }

    #[test]
    fn approver_bypasses_ownership() {
        let owner = UserId::new();
        let approver = CallerIdentity::approver(UserId::new());
        assert!(ensure_owner_or_approver(&approver, owner, "detail").is_ok());
    }

    #[test]
    fn requester_must_own_the_record() {
        let owner = UserId::new();
        let me = CallerIdentity::requester(owner);
        let stranger = CallerIdentity::requester(UserId::new());
        assert!(ensure_owner_or_approver(&me, owner, "transaction").is_ok());

        let err: DomainError = ensure_owner_or_approver(&stranger, owner, "transaction")
            .unwrap_err()
            .into();
        assert_eq!(err, DomainError::forbidden("caller does not own this transaction"));
    }
}
