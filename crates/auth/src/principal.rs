use serde::{Deserialize, Serialize};

use loantrack_core::UserId;

use crate::Role;

/// The resolved caller of a core operation.
///
/// Always passed explicitly; the core never reads identity from ambient state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub role: Role,
}

impl CallerIdentity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn requester(user_id: UserId) -> Self {
        Self::new(user_id, Role::Requester)
    }

    pub fn approver(user_id: UserId) -> Self {
        Self::new(user_id, Role::Approver)
    }

    pub fn is_approver(&self) -> bool {
        self.role.is_approver()
    }
}
