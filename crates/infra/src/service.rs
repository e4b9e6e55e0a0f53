//! `LoanService`: the exposed loan operations.
//!
//! Each call opens exactly one unit of work on the store, runs the matching
//! component inside it and commits only if the whole operation succeeded.

use chrono::{DateTime, Utc};
use tracing::instrument;

use loantrack_auth::{CallerIdentity, Role};
use loantrack_core::{DetailId, ItemId, Quantity, TransactionId, UserId};
use loantrack_inventory::Item;
use loantrack_loans::{Account, DetailStatus, LoanDates, Transaction};

use crate::accounts::Accounts;
use crate::catalogue::Catalogue;
use crate::config::Settings;
use crate::detail_workflow::DetailWorkflow;
use crate::dto::{AccountDeletion, AccountPatch, DetailView, DraftPatch, ItemPatch};
use crate::error::LoanError;
use crate::loan_orchestrator::LoanOrchestrator;
use crate::store::LoanStore;
use crate::transaction_manager::{DraftOutcome, TransactionManager};

pub struct LoanService<S> {
    store: S,
    settings: Settings,
}

impl<S> LoanService<S>
where
    S: LoanStore,
{
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // --- accounts ---

    #[instrument(skip(self), err)]
    pub fn register_account(
        &self,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<Account, LoanError> {
        self.store.unit_of_work(|uow| Accounts::new(uow).register(name, email, role))
    }

    pub fn get_account(&self, caller: &CallerIdentity, id: UserId) -> Result<Account, LoanError> {
        self.store.unit_of_work(|uow| Accounts::new(uow).get(caller, id))
    }

    pub fn list_accounts(&self, caller: &CallerIdentity) -> Result<Vec<Account>, LoanError> {
        self.store.unit_of_work(|uow| Accounts::new(uow).list(caller))
    }

    #[instrument(skip(self), err)]
    pub fn update_account(
        &self,
        caller: &CallerIdentity,
        id: UserId,
        patch: AccountPatch,
    ) -> Result<Account, LoanError> {
        self.store.unit_of_work(|uow| Accounts::new(uow).update(caller, id, patch))
    }

    #[instrument(skip(self), err)]
    pub fn delete_account(
        &self,
        caller: &CallerIdentity,
        user_id: UserId,
    ) -> Result<AccountDeletion, LoanError> {
        self.store
            .unit_of_work(|uow| LoanOrchestrator::new(uow).delete_account(caller, user_id))
    }

    // --- item catalogue ---

    #[instrument(skip(self), err)]
    pub fn create_item(
        &self,
        caller: &CallerIdentity,
        name: &str,
        stock: i64,
    ) -> Result<Item, LoanError> {
        self.store.unit_of_work(|uow| Catalogue::new(uow).create(caller, name, stock))
    }

    #[instrument(skip(self), err)]
    pub fn update_item(
        &self,
        caller: &CallerIdentity,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<Item, LoanError> {
        self.store.unit_of_work(|uow| Catalogue::new(uow).update(caller, id, patch))
    }

    #[instrument(skip(self), err)]
    pub fn delete_item(&self, caller: &CallerIdentity, id: ItemId) -> Result<(), LoanError> {
        self.store.unit_of_work(|uow| Catalogue::new(uow).delete(caller, id))
    }

    pub fn get_item(&self, id: ItemId) -> Result<Item, LoanError> {
        self.store.unit_of_work(|uow| Catalogue::new(uow).get(id))
    }

    pub fn list_items(&self) -> Result<Vec<Item>, LoanError> {
        self.store.unit_of_work(|uow| Catalogue::new(uow).list())
    }

    // --- cart ---

    /// Add an item to the caller's cart (creates or merges a draft line).
    #[instrument(skip(self), err)]
    pub fn request_item(
        &self,
        caller: &CallerIdentity,
        item_id: ItemId,
        qty: Quantity,
    ) -> Result<DraftOutcome, LoanError> {
        self.store.unit_of_work(|uow| {
            TransactionManager::new(uow).create_or_merge_draft(caller, item_id, qty)
        })
    }

    #[instrument(skip(self), err)]
    pub fn update_draft(
        &self,
        caller: &CallerIdentity,
        id: TransactionId,
        patch: DraftPatch,
    ) -> Result<Transaction, LoanError> {
        self.store
            .unit_of_work(|uow| TransactionManager::new(uow).update_draft(caller, id, patch))
    }

    #[instrument(skip(self), err)]
    pub fn delete_transaction(
        &self,
        caller: &CallerIdentity,
        id: TransactionId,
    ) -> Result<(), LoanError> {
        self.store.unit_of_work(|uow| TransactionManager::new(uow).remove_draft(caller, id))
    }

    pub fn list_transactions(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<Transaction>, LoanError> {
        self.store.unit_of_work(|uow| TransactionManager::new(uow).visible_to(caller))
    }

    // --- loans ---

    /// Submit the caller's cart as one loan batch stamped with `requested_at`.
    #[instrument(skip(self), err)]
    pub fn submit_loan(
        &self,
        caller: &CallerIdentity,
        dates: LoanDates,
        requested_at: DateTime<Utc>,
    ) -> Result<DetailView, LoanError> {
        let prefix = self.settings.code_prefix.as_str();
        self.store.unit_of_work(|uow| {
            LoanOrchestrator::new(uow).submit_loan(caller, dates, requested_at, prefix)
        })
    }

    pub fn get_detail(
        &self,
        caller: &CallerIdentity,
        id: DetailId,
    ) -> Result<DetailView, LoanError> {
        self.store.unit_of_work(|uow| DetailWorkflow::new(uow).get(caller, id))
    }

    pub fn list_details(&self, caller: &CallerIdentity) -> Result<Vec<DetailView>, LoanError> {
        self.store.unit_of_work(|uow| DetailWorkflow::new(uow).list(caller))
    }

    #[instrument(skip(self), err)]
    pub fn transition_detail(
        &self,
        caller: &CallerIdentity,
        id: DetailId,
        to: DetailStatus,
    ) -> Result<DetailView, LoanError> {
        self.store.unit_of_work(|uow| DetailWorkflow::new(uow).transition(caller, id, to))
    }

    #[instrument(skip(self), err)]
    pub fn edit_detail_dates(
        &self,
        caller: &CallerIdentity,
        id: DetailId,
        dates: LoanDates,
    ) -> Result<DetailView, LoanError> {
        self.store.unit_of_work(|uow| DetailWorkflow::new(uow).edit_dates(caller, id, dates))
    }

    /// Delete a `pending` or `rejected` batch; returns the number of lines removed.
    #[instrument(skip(self), err)]
    pub fn delete_detail(&self, caller: &CallerIdentity, id: DetailId) -> Result<usize, LoanError> {
        self.store.unit_of_work(|uow| DetailWorkflow::new(uow).delete(caller, id))
    }
}
