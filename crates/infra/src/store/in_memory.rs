use std::collections::BTreeMap;
use std::sync::Mutex;

use loantrack_core::{DetailId, Entity, ItemId, TransactionId, UserId};
use loantrack_inventory::Item;
use loantrack_loans::{Account, Detail, Transaction};

use super::r#trait::{LoanStore, UnitOfWork};
use crate::error::{LoanError, StoreError};

/// Table selector used for write-failure injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Table {
    Accounts,
    Items,
    Transactions,
    Details,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: BTreeMap<UserId, Account>,
    items: BTreeMap<ItemId, Item>,
    transactions: BTreeMap<TransactionId, Transaction>,
    details: BTreeMap<DetailId, Detail>,
}

#[derive(Debug, Copy, Clone)]
struct WriteFault {
    table: Table,
    remaining: usize,
}

/// In-memory loan store.
///
/// Intended for tests/dev. Units of work run one at a time against a copy of
/// the tables, which is swapped in on commit: that makes every unit of work
/// serializable and every row lock trivially held. Not optimized for
/// performance.
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    tables: Mutex<Tables>,
    fault: Mutex<Option<WriteFault>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` write (1-based) to `table` fail in the next unit of work.
    pub fn fail_nth_write(&self, table: Table, nth: usize) -> Result<(), StoreError> {
        let mut fault = self.fault.lock().map_err(|_| StoreError::LockPoisoned)?;
        *fault = Some(WriteFault {
            table,
            remaining: nth.max(1),
        });
        Ok(())
    }
}

impl LoanStore for InMemoryLoanStore {
    fn unit_of_work<T, F>(&self, work: F) -> Result<T, LoanError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, LoanError>,
    {
        let mut committed = self.tables.lock().map_err(|_| StoreError::LockPoisoned)?;
        let fault = self
            .fault
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .take();

        let mut uow = InMemoryUnitOfWork {
            tables: committed.clone(),
            fault,
        };

        // On error the working copy is dropped: nothing reaches `committed`.
        let out = work(&mut uow)?;
        *committed = uow.tables;
        Ok(out)
    }
}

struct InMemoryUnitOfWork {
    tables: Tables,
    fault: Option<WriteFault>,
}

impl InMemoryUnitOfWork {
    fn write(&mut self, table: Table) -> Result<(), StoreError> {
        if let Some(fault) = self.fault.as_mut() {
            if fault.table == table {
                fault.remaining -= 1;
                if fault.remaining == 0 {
                    self.fault = None;
                    return Err(StoreError::WriteFailed(format!(
                        "injected failure writing {table:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_item_name(&self, item: &Item) -> Result<(), StoreError> {
        let clash = self
            .tables
            .items
            .values()
            .any(|other| other.id() != item.id() && other.name().eq_ignore_ascii_case(item.name()));
        if clash {
            return Err(StoreError::UniqueViolation(format!("item name '{}'", item.name())));
        }
        Ok(())
    }

    fn check_transaction_refs(&self, trx: &Transaction) -> Result<(), StoreError> {
        if !self.tables.accounts.contains_key(&trx.user_id()) {
            return Err(StoreError::ForeignKey(format!("account {}", trx.user_id())));
        }
        if !self.tables.items.contains_key(&trx.item_id()) {
            return Err(StoreError::ForeignKey(format!("item {}", trx.item_id())));
        }
        if let Some(detail_id) = trx.detail_id() {
            if !self.tables.details.contains_key(&detail_id) {
                return Err(StoreError::ForeignKey(format!("detail {detail_id}")));
            }
        }
        if trx.is_draft() {
            let duplicate = self.tables.transactions.values().any(|other| {
                other.id() != trx.id()
                    && other.is_draft()
                    && other.user_id() == trx.user_id()
                    && other.item_id() == trx.item_id()
            });
            if duplicate {
                return Err(StoreError::UniqueViolation(format!(
                    "draft for user {} and item {}",
                    trx.user_id(),
                    trx.item_id()
                )));
            }
        }
        Ok(())
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn account(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.accounts.get(&id).cloned())
    }

    fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .tables
            .accounts
            .values()
            .find(|a| a.email().eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.tables.accounts.values().cloned().collect())
    }

    fn insert_account(&mut self, account: Account) -> Result<(), StoreError> {
        if self.tables.accounts.contains_key(account.id()) {
            return Err(StoreError::UniqueViolation(format!("account {}", account.id())));
        }
        if self.tables.accounts.values().any(|a| a.email() == account.email()) {
            return Err(StoreError::UniqueViolation(format!("email '{}'", account.email())));
        }
        self.write(Table::Accounts)?;
        self.tables.accounts.insert(*account.id(), account);
        Ok(())
    }

    fn update_account(&mut self, account: &Account) -> Result<(), StoreError> {
        if !self.tables.accounts.contains_key(account.id()) {
            return Err(StoreError::MissingRow(format!("account {}", account.id())));
        }
        if self
            .tables
            .accounts
            .values()
            .any(|a| a.id() != account.id() && a.email() == account.email())
        {
            return Err(StoreError::UniqueViolation(format!("email '{}'", account.email())));
        }
        self.write(Table::Accounts)?;
        self.tables.accounts.insert(*account.id(), account.clone());
        Ok(())
    }

    fn delete_account(&mut self, id: UserId) -> Result<(), StoreError> {
        if self.tables.transactions.values().any(|t| t.user_id() == id) {
            return Err(StoreError::ForeignKey(format!("account {id} still has transactions")));
        }
        self.write(Table::Accounts)?;
        self.tables
            .accounts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::MissingRow(format!("account {id}")))
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.tables.items.get(&id).cloned())
    }

    fn item_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        Ok(self
            .tables
            .items
            .values()
            .find(|item| item.name().eq_ignore_ascii_case(name.trim()))
            .cloned())
    }

    fn item_for_update(&mut self, id: ItemId) -> Result<Option<Item>, StoreError> {
        // The whole unit of work already holds the store lock.
        self.item(id)
    }

    fn items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.tables.items.values().cloned().collect())
    }

    fn insert_item(&mut self, item: Item) -> Result<(), StoreError> {
        if self.tables.items.contains_key(item.id()) {
            return Err(StoreError::UniqueViolation(format!("item {}", item.id())));
        }
        self.check_item_name(&item)?;
        self.write(Table::Items)?;
        self.tables.items.insert(*item.id(), item);
        Ok(())
    }

    fn update_item(&mut self, item: &Item) -> Result<(), StoreError> {
        if !self.tables.items.contains_key(item.id()) {
            return Err(StoreError::MissingRow(format!("item {}", item.id())));
        }
        self.check_item_name(item)?;
        self.write(Table::Items)?;
        self.tables.items.insert(*item.id(), item.clone());
        Ok(())
    }

    fn delete_item(&mut self, id: ItemId) -> Result<(), StoreError> {
        if self.item_in_use(id)? {
            return Err(StoreError::ForeignKey(format!("item {id} is referenced by transactions")));
        }
        self.write(Table::Items)?;
        self.tables
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::MissingRow(format!("item {id}")))
    }

    fn item_in_use(&self, id: ItemId) -> Result<bool, StoreError> {
        Ok(self.tables.transactions.values().any(|t| t.item_id() == id))
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.tables.transactions.get(&id).cloned())
    }

    fn draft_for(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .tables
            .transactions
            .values()
            .find(|t| t.is_draft() && t.user_id() == user_id && t.item_id() == item_id)
            .cloned())
    }

    fn transactions_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .tables
            .transactions
            .values()
            .filter(|t| t.user_id() == user_id)
            .cloned()
            .collect())
    }

    fn transactions_by_detail(&self, detail_id: DetailId) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .tables
            .transactions
            .values()
            .filter(|t| t.detail_id() == Some(detail_id))
            .cloned()
            .collect())
    }

    fn transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.tables.transactions.values().cloned().collect())
    }

    fn insert_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError> {
        if self.tables.transactions.contains_key(transaction.id()) {
            return Err(StoreError::UniqueViolation(format!("transaction {}", transaction.id())));
        }
        self.check_transaction_refs(&transaction)?;
        self.write(Table::Transactions)?;
        self.tables.transactions.insert(*transaction.id(), transaction);
        Ok(())
    }

    fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        if !self.tables.transactions.contains_key(transaction.id()) {
            return Err(StoreError::MissingRow(format!("transaction {}", transaction.id())));
        }
        self.check_transaction_refs(transaction)?;
        self.write(Table::Transactions)?;
        self.tables
            .transactions
            .insert(*transaction.id(), transaction.clone());
        Ok(())
    }

    fn delete_transaction(&mut self, id: TransactionId) -> Result<(), StoreError> {
        self.write(Table::Transactions)?;
        self.tables
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::MissingRow(format!("transaction {id}")))
    }

    fn detail(&self, id: DetailId) -> Result<Option<Detail>, StoreError> {
        Ok(self.tables.details.get(&id).cloned())
    }

    fn details(&self) -> Result<Vec<Detail>, StoreError> {
        Ok(self.tables.details.values().cloned().collect())
    }

    fn insert_detail(&mut self, detail: Detail) -> Result<(), StoreError> {
        if self.tables.details.contains_key(detail.id()) {
            return Err(StoreError::UniqueViolation(format!("detail {}", detail.id())));
        }
        self.write(Table::Details)?;
        self.tables.details.insert(*detail.id(), detail);
        Ok(())
    }

    fn update_detail(&mut self, detail: &Detail) -> Result<(), StoreError> {
        if !self.tables.details.contains_key(detail.id()) {
            return Err(StoreError::MissingRow(format!("detail {}", detail.id())));
        }
        self.write(Table::Details)?;
        self.tables.details.insert(*detail.id(), detail.clone());
        Ok(())
    }

    fn delete_detail(&mut self, id: DetailId) -> Result<(), StoreError> {
        if self
            .tables
            .transactions
            .values()
            .any(|t| t.detail_id() == Some(id))
        {
            return Err(StoreError::ForeignKey(format!("detail {id} still has transactions")));
        }
        self.write(Table::Details)?;
        self.tables
            .details
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::MissingRow(format!("detail {id}")))
    }
}
