//! Transaction Manager: cart lines and their attachment to loan batches.

use tracing::{debug, warn};

use loantrack_auth::{CallerIdentity, Role, ensure_owner_or_approver, require_role};
use loantrack_core::{DetailId, DomainError, Entity, ItemId, Quantity, TransactionId, UserId};
use loantrack_loans::Transaction;

use crate::dto::DraftPatch;
use crate::error::LoanError;
use crate::stock_ledger::{StockLedger, StockLine};
use crate::store::UnitOfWork;

/// Result of adding an item to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// A new draft line was inserted.
    Created(Transaction),
    /// The existing draft line for the same item absorbed the quantity.
    Merged(Transaction),
}

impl DraftOutcome {
    pub fn transaction(&self) -> &Transaction {
        match self {
            DraftOutcome::Created(t) | DraftOutcome::Merged(t) => t,
        }
    }
}

pub struct TransactionManager<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> TransactionManager<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    fn load(&self, id: TransactionId) -> Result<Transaction, LoanError> {
        Ok(self
            .uow
            .transaction(id)?
            .ok_or_else(|| Transaction::not_found(&id))?)
    }

    /// Add `qty` of `item_id` to the caller's cart.
    ///
    /// Merges into an existing draft for the same item rather than creating a
    /// second line. Stock is only checked here, never reserved.
    pub fn create_or_merge_draft(
        &mut self,
        caller: &CallerIdentity,
        item_id: ItemId,
        qty: Quantity,
    ) -> Result<DraftOutcome, LoanError> {
        require_role(caller, Role::Requester)?;
        let user_id = caller.user_id;

        match self.uow.draft_for(user_id, item_id)? {
            Some(mut existing) => {
                let total = existing.merged_quantity(qty)?;
                StockLedger::new(&mut *self.uow).ensure_available(item_id, total)?;
                existing.set_quantity(total)?;
                self.uow.update_transaction(&existing)?;
                debug!(transaction_id = %existing.id(), quantity = total.get(), "draft merged");
                Ok(DraftOutcome::Merged(existing))
            }
            None => {
                StockLedger::new(&mut *self.uow).ensure_available(item_id, qty)?;
                let draft = Transaction::draft(TransactionId::new(), user_id, item_id, qty);
                self.uow.insert_transaction(draft.clone())?;
                debug!(transaction_id = %draft.id(), quantity = qty.get(), "draft created");
                Ok(DraftOutcome::Created(draft))
            }
        }
    }

    /// The caller's current cart.
    pub fn drafts_of(&self, user_id: UserId) -> Result<Vec<Transaction>, LoanError> {
        Ok(self
            .uow
            .transactions_by_user(user_id)?
            .into_iter()
            .filter(Transaction::is_draft)
            .collect())
    }

    /// Bind every given draft to `detail_id` and flip it to `pending`.
    ///
    /// Any failing row fails the whole call with `AttachFailed`; the caller's
    /// unit of work then rolls back the rows already attached.
    pub fn attach_to_detail(
        &mut self,
        drafts: Vec<Transaction>,
        detail_id: DetailId,
    ) -> Result<Vec<Transaction>, LoanError> {
        let mut attached = Vec::with_capacity(drafts.len());
        for mut trx in drafts {
            trx.attach(detail_id)?;
            if let Err(err) = self.uow.update_transaction(&trx) {
                warn!(
                    transaction_id = %trx.id(),
                    detail_id = %detail_id,
                    error = %err,
                    "attach failed"
                );
                return Err(LoanError::AttachFailed(format!(
                    "failed to update transaction {}: {err}",
                    trx.id()
                )));
            }
            attached.push(trx);
        }
        Ok(attached)
    }

    /// Mark every line of a batch that just became `loaned` as `finish`.
    pub fn mark_finished(&mut self, lines: &mut [Transaction]) -> Result<(), LoanError> {
        for trx in lines.iter_mut() {
            trx.finish()?;
            self.uow.update_transaction(trx)?;
        }
        Ok(())
    }

    /// Delete the lines of a batch that is itself being deleted.
    pub fn delete_children(&mut self, detail_id: DetailId) -> Result<usize, LoanError> {
        let children = self.uow.transactions_by_detail(detail_id)?;
        for trx in &children {
            self.uow.delete_transaction(*trx.id())?;
        }
        Ok(children.len())
    }

    /// Change the item and/or quantity of a draft line.
    pub fn update_draft(
        &mut self,
        caller: &CallerIdentity,
        id: TransactionId,
        patch: DraftPatch,
    ) -> Result<Transaction, LoanError> {
        let mut trx = self.load(id)?;
        ensure_owner_or_approver(caller, trx.user_id(), "transaction")?;
        if !trx.is_draft() {
            return Err(DomainError::invalid_operation(format!(
                "transaction can only be updated while 'draft' (current: '{}')",
                trx.status()
            ))
            .into());
        }

        if let Some(item_id) = patch.item_id.filter(|item_id| *item_id != trx.item_id()) {
            if self.uow.draft_for(trx.user_id(), item_id)?.is_some() {
                return Err(DomainError::invalid_operation(format!(
                    "a draft for item {item_id} already exists; update that line instead"
                ))
                .into());
            }
            trx.set_item(item_id)?;
        }
        if let Some(quantity) = patch.quantity {
            trx.set_quantity(quantity)?;
        }
        // Re-validated even when only the item changed.
        StockLedger::new(&mut *self.uow).ensure_available(trx.item_id(), trx.quantity())?;

        self.uow.update_transaction(&trx)?;
        Ok(trx)
    }

    /// Remove a cart line. Only drafts can be removed on their own.
    pub fn remove_draft(
        &mut self,
        caller: &CallerIdentity,
        id: TransactionId,
    ) -> Result<(), LoanError> {
        let trx = self.load(id)?;
        ensure_owner_or_approver(caller, trx.user_id(), "transaction")?;
        trx.ensure_removable()?;
        self.uow.delete_transaction(id)?;
        Ok(())
    }

    /// Requesters see their own lines, approvers see every line.
    pub fn visible_to(&self, caller: &CallerIdentity) -> Result<Vec<Transaction>, LoanError> {
        Ok(if caller.is_approver() {
            self.uow.transactions()?
        } else {
            self.uow.transactions_by_user(caller.user_id)?
        })
    }
}

/// Stock claims of a set of lines.
pub fn stock_lines(lines: &[Transaction]) -> Vec<StockLine> {
    lines
        .iter()
        .map(|t| StockLine {
            item_id: t.item_id(),
            quantity: t.quantity(),
        })
        .collect()
}
