//! Detail Workflow: the loan batch state machine and its stock side effects.
//!
//! | from     | to       | who              | stock                   |
//! |----------|----------|------------------|-------------------------|
//! | pending  | loaned   | approver         | reserve every line      |
//! | pending  | rejected | approver         | -                       |
//! | loaned   | return   | approver         | release every line      |
//! | loaned   | pending  | approver         | release every line      |
//! | loaned   | rejected | approver         | release every line      |
//! | rejected | pending  | owner / approver | -                       |
//!
//! Each call runs inside the caller's unit of work, so the status flip and
//! all stock movements of a batch commit together or not at all.

use chrono::{DateTime, Utc};
use tracing::info;

use loantrack_auth::{AuthzError, CallerIdentity, Role, require_role};
use loantrack_core::{DetailId, Entity};
use loantrack_loans::{Detail, DetailCode, DetailStatus, LoanDates, StockEffect, Transaction};

use crate::dto::DetailView;
use crate::error::LoanError;
use crate::stock_ledger::StockLedger;
use crate::store::UnitOfWork;
use crate::transaction_manager::{TransactionManager, stock_lines};

pub struct DetailWorkflow<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> DetailWorkflow<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    fn load(&self, id: DetailId) -> Result<DetailView, LoanError> {
        let detail = self
            .uow
            .detail(id)?
            .ok_or_else(|| Detail::not_found(&id))?;
        let transactions = self.uow.transactions_by_detail(id)?;
        Ok(DetailView {
            detail,
            transactions,
        })
    }

    /// Open a new `pending` batch and attach the given drafts to it.
    pub fn create(
        &mut self,
        drafts: Vec<Transaction>,
        code: DetailCode,
        dates: LoanDates,
        requested_at: DateTime<Utc>,
    ) -> Result<DetailView, LoanError> {
        let detail = Detail::submitted(DetailId::new(), code, dates, requested_at);
        self.uow.insert_detail(detail.clone())?;
        let transactions =
            TransactionManager::new(&mut *self.uow).attach_to_detail(drafts, *detail.id())?;
        Ok(DetailView {
            detail,
            transactions,
        })
    }

    /// Move a batch to `to`, applying the edge's stock effect to every line.
    pub fn transition(
        &mut self,
        caller: &CallerIdentity,
        id: DetailId,
        to: DetailStatus,
    ) -> Result<DetailView, LoanError> {
        let DetailView {
            mut detail,
            mut transactions,
        } = self.load(id)?;
        ensure_visible(caller, &transactions)?;

        let plan = detail.plan_transition(to)?;
        if plan.approver_only {
            require_role(caller, Role::Approver)?;
        }

        match plan.effect {
            StockEffect::Reserve => {
                StockLedger::new(&mut *self.uow).reserve_all(&stock_lines(&transactions))?;
                TransactionManager::new(&mut *self.uow).mark_finished(&mut transactions)?;
            }
            StockEffect::Release => {
                StockLedger::new(&mut *self.uow).release_all(&stock_lines(&transactions))?;
            }
            StockEffect::None => {}
        }

        detail.apply_transition(&plan)?;
        self.uow.update_detail(&detail)?;

        info!(
            detail_id = %id,
            from = %plan.from,
            to = %plan.to,
            lines = transactions.len(),
            "detail status changed"
        );
        Ok(DetailView {
            detail,
            transactions,
        })
    }

    /// The owning requester moves the planned dates of a `pending` batch.
    pub fn edit_dates(
        &mut self,
        caller: &CallerIdentity,
        id: DetailId,
        patch: LoanDates,
    ) -> Result<DetailView, LoanError> {
        require_role(caller, Role::Requester)?;
        let mut view = self.load(id)?;
        ensure_visible(caller, &view.transactions)?;

        view.detail.edit_dates(patch)?;
        self.uow.update_detail(&view.detail)?;
        Ok(view)
    }

    /// Delete a `pending` or `rejected` batch together with its lines.
    ///
    /// Returns how many lines were removed.
    pub fn delete(&mut self, caller: &CallerIdentity, id: DetailId) -> Result<usize, LoanError> {
        let view = self.load(id)?;
        ensure_visible(caller, &view.transactions)?;
        view.detail.ensure_deletable()?;

        let removed = TransactionManager::new(&mut *self.uow).delete_children(id)?;
        self.uow.delete_detail(id)?;
        info!(detail_id = %id, lines = removed, "detail deleted");
        Ok(removed)
    }

    pub fn get(&self, caller: &CallerIdentity, id: DetailId) -> Result<DetailView, LoanError> {
        let view = self.load(id)?;
        ensure_visible(caller, &view.transactions)?;
        Ok(view)
    }

    /// Requesters see batches reachable through their own lines, approvers see all.
    pub fn list(&self, caller: &CallerIdentity) -> Result<Vec<DetailView>, LoanError> {
        let ids: Vec<DetailId> = if caller.is_approver() {
            self.uow.details()?.iter().map(|d| *d.id()).collect()
        } else {
            let mut ids: Vec<DetailId> = self
                .uow
                .transactions_by_user(caller.user_id)?
                .iter()
                .filter_map(Transaction::detail_id)
                .collect();
            ids.sort();
            ids.dedup();
            ids
        };

        ids.into_iter().map(|id| self.load(id)).collect()
    }
}

/// Approvers see every batch; requesters only those holding one of their lines.
fn ensure_visible(caller: &CallerIdentity, lines: &[Transaction]) -> Result<(), LoanError> {
    if caller.is_approver() || lines.iter().any(|t| t.user_id() == caller.user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner("detail").into())
    }
}
