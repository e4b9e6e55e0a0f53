//! Account register and self-service profile maintenance.
//!
//! Deleting an account touches loans and stock, so it lives in the
//! orchestrator instead.

use tracing::info;

use loantrack_auth::{AuthzError, CallerIdentity, Role, ensure_owner_or_approver, require_role};
use loantrack_core::{DomainError, Entity, UserId};
use loantrack_loans::Account;

use crate::dto::AccountPatch;
use crate::error::LoanError;
use crate::store::UnitOfWork;

pub struct Accounts<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> Accounts<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    fn load(&self, id: UserId) -> Result<Account, LoanError> {
        Ok(self.uow.account(id)?.ok_or_else(|| Account::not_found(&id))?)
    }

    fn ensure_email_free(&self, email: &str, except: Option<UserId>) -> Result<(), LoanError> {
        match self.uow.account_by_email(email)? {
            Some(existing) if Some(*existing.id()) != except => Err(DomainError::invalid_operation(
                format!("an account with email '{}' already exists", existing.email()),
            )
            .into()),
            _ => Ok(()),
        }
    }

    pub fn register(&mut self, name: &str, email: &str, role: Role) -> Result<Account, LoanError> {
        let account = Account::new(UserId::new(), name, email, role)?;
        self.ensure_email_free(account.email(), None)?;
        self.uow.insert_account(account.clone())?;
        info!(user_id = %account.id(), role = %role, "account registered");
        Ok(account)
    }

    /// Requesters may only read their own record.
    pub fn get(&self, caller: &CallerIdentity, id: UserId) -> Result<Account, LoanError> {
        let account = self.load(id)?;
        ensure_owner_or_approver(caller, id, "account")?;
        Ok(account)
    }

    pub fn list(&self, caller: &CallerIdentity) -> Result<Vec<Account>, LoanError> {
        require_role(caller, Role::Approver)?;
        Ok(self.uow.accounts()?)
    }

    /// Change the caller's own name and/or email.
    pub fn update(
        &mut self,
        caller: &CallerIdentity,
        id: UserId,
        patch: AccountPatch,
    ) -> Result<Account, LoanError> {
        let mut account = self.load(id)?;
        if caller.user_id != id {
            return Err(AuthzError::NotOwner("account").into());
        }

        if let Some(name) = patch.name {
            account.rename(&name)?;
        }
        if let Some(email) = patch.email {
            account.change_email(&email)?;
            self.ensure_email_free(account.email(), Some(id))?;
        }

        self.uow.update_account(&account)?;
        info!(user_id = %id, "account updated");
        Ok(account)
    }
}
