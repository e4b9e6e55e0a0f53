use std::sync::Arc;

use loantrack_core::{DetailId, ItemId, TransactionId, UserId};
use loantrack_inventory::Item;
use loantrack_loans::{Account, Detail, Transaction};

use crate::error::{LoanError, StoreError};

/// Row-level access inside one unit of work.
///
/// Every read observes the writes made earlier in the same unit of work.
/// Nothing is visible to other units of work until the enclosing
/// [`LoanStore::unit_of_work`] commits.
///
/// ## Integrity expected from implementations
///
/// - item names and account emails are unique (`UniqueViolation`)
/// - a transaction references an existing item, account and (if set) detail
///   (`ForeignKey`)
/// - an item or detail still referenced by a transaction cannot be deleted
///   (`ForeignKey`)
/// - updates and deletes of absent rows fail with `MissingRow`
pub trait UnitOfWork {
    fn account(&self, id: UserId) -> Result<Option<Account>, StoreError>;
    fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
    fn insert_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn update_account(&mut self, account: &Account) -> Result<(), StoreError>;
    fn delete_account(&mut self, id: UserId) -> Result<(), StoreError>;

    fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;
    fn item_by_name(&self, name: &str) -> Result<Option<Item>, StoreError>;
    /// Read an item and hold its row lock until the unit of work ends.
    ///
    /// Every stock mutation must read through here (`SELECT ... FOR UPDATE`
    /// in SQL backends) so that two approvals cannot both pass the
    /// sufficiency check against the same stock value.
    fn item_for_update(&mut self, id: ItemId) -> Result<Option<Item>, StoreError>;
    fn items(&self) -> Result<Vec<Item>, StoreError>;
    fn insert_item(&mut self, item: Item) -> Result<(), StoreError>;
    fn update_item(&mut self, item: &Item) -> Result<(), StoreError>;
    fn delete_item(&mut self, id: ItemId) -> Result<(), StoreError>;
    fn item_in_use(&self, id: ItemId) -> Result<bool, StoreError>;

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;
    /// The draft line of `user_id` for `item_id`, if any (at most one exists).
    fn draft_for(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<Transaction>, StoreError>;
    fn transactions_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError>;
    fn transactions_by_detail(&self, detail_id: DetailId) -> Result<Vec<Transaction>, StoreError>;
    fn transactions(&self) -> Result<Vec<Transaction>, StoreError>;
    fn insert_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError>;
    fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError>;
    fn delete_transaction(&mut self, id: TransactionId) -> Result<(), StoreError>;

    fn detail(&self, id: DetailId) -> Result<Option<Detail>, StoreError>;
    fn details(&self) -> Result<Vec<Detail>, StoreError>;
    fn insert_detail(&mut self, detail: Detail) -> Result<(), StoreError>;
    fn update_detail(&mut self, detail: &Detail) -> Result<(), StoreError>;
    fn delete_detail(&mut self, id: DetailId) -> Result<(), StoreError>;
}

/// Source of serializable units of work.
///
/// `work` runs against a private view of the store. Returning `Ok` commits
/// every write it made in one step; returning `Err` discards all of them.
/// There is no retry: the error is handed back to the caller as is.
pub trait LoanStore: Send + Sync {
    fn unit_of_work<T, F>(&self, work: F) -> Result<T, LoanError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, LoanError>;
}

impl<S> LoanStore for Arc<S>
where
    S: LoanStore,
{
    fn unit_of_work<T, F>(&self, work: F) -> Result<T, LoanError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, LoanError>,
    {
        (**self).unit_of_work(work)
    }
}
