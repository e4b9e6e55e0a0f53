//! Loan Orchestrator: use cases spanning carts, batches and stock.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::info;

use loantrack_auth::{CallerIdentity, Role, require_role};
use loantrack_core::{DetailId, DomainError, Entity, UserId};
use loantrack_loans::{Account, Detail, DetailCode, DetailStatus, LoanDates};

use crate::detail_workflow::DetailWorkflow;
use crate::dto::{AccountDeletion, DetailView};
use crate::error::LoanError;
use crate::stock_ledger::StockLedger;
use crate::store::UnitOfWork;
use crate::transaction_manager::TransactionManager;

pub struct LoanOrchestrator<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> LoanOrchestrator<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// Turn the caller's whole cart into one `pending` loan batch.
    pub fn submit_loan(
        &mut self,
        caller: &CallerIdentity,
        dates: LoanDates,
        requested_at: DateTime<Utc>,
        code_prefix: &str,
    ) -> Result<DetailView, LoanError> {
        require_role(caller, Role::Requester)?;

        let drafts = TransactionManager::new(&mut *self.uow).drafts_of(caller.user_id)?;
        if drafts.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }

        let code = DetailCode::generate(code_prefix, requested_at, caller.user_id);
        let view = DetailWorkflow::new(&mut *self.uow).create(drafts, code, dates, requested_at)?;
        info!(
            detail_id = %view.detail.id(),
            code = %view.detail.code(),
            lines = view.transactions.len(),
            "loan submitted"
        );
        Ok(view)
    }

    /// Remove an account and everything hanging off it.
    ///
    /// Stock held by batches still `loaned` is released first; then the
    /// user's lines, the batches left without lines, and the account itself
    /// are deleted. Any failure aborts the caller's unit of work.
    pub fn delete_account(
        &mut self,
        caller: &CallerIdentity,
        user_id: UserId,
    ) -> Result<AccountDeletion, LoanError> {
        require_role(caller, Role::Approver)?;
        if self.uow.account(user_id)?.is_none() {
            return Err(Account::not_found(&user_id).into());
        }

        let lines = self.uow.transactions_by_user(user_id)?;

        let mut released = Vec::new();
        let mut details = BTreeSet::new();
        for trx in &lines {
            let Some(detail_id) = trx.detail_id() else {
                continue;
            };
            let detail = self
                .uow
                .detail(detail_id)?
                .ok_or_else(|| Detail::not_found(&detail_id))?;
            if detail.status() == DetailStatus::Loaned {
                StockLedger::new(&mut *self.uow).release(trx.item_id(), trx.quantity())?;
                released.push((trx.item_id(), trx.quantity()));
            }
            details.insert(detail_id);
        }

        for trx in &lines {
            self.uow.delete_transaction(*trx.id())?;
        }

        let mut details_deleted = 0;
        for detail_id in details {
            if self.orphaned(detail_id)? {
                self.uow.delete_detail(detail_id)?;
                details_deleted += 1;
            }
        }

        self.uow.delete_account(user_id)?;

        info!(
            user_id = %user_id,
            transactions = lines.len(),
            details = details_deleted,
            released = released.len(),
            "account deleted"
        );
        Ok(AccountDeletion {
            user_id,
            released,
            details_deleted,
            transactions_deleted: lines.len(),
        })
    }

    fn orphaned(&self, detail_id: DetailId) -> Result<bool, LoanError> {
        Ok(self.uow.transactions_by_detail(detail_id)?.is_empty())
    }
}
