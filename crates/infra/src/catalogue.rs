//! Item catalogue maintenance (approver only).

use tracing::info;

use loantrack_auth::{CallerIdentity, Role, require_role};
use loantrack_core::{DomainError, Entity, ItemId};
use loantrack_inventory::Item;

use crate::dto::ItemPatch;
use crate::error::LoanError;
use crate::stock_ledger::StockLedger;
use crate::store::UnitOfWork;

pub struct Catalogue<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> Catalogue<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    pub fn get(&self, id: ItemId) -> Result<Item, LoanError> {
        Ok(self.uow.item(id)?.ok_or_else(|| Item::not_found(&id))?)
    }

    pub fn list(&self) -> Result<Vec<Item>, LoanError> {
        Ok(self.uow.items()?)
    }

    fn ensure_name_free(&self, name: &str, except: Option<ItemId>) -> Result<(), LoanError> {
        match self.uow.item_by_name(name)? {
            Some(existing) if Some(*existing.id()) != except => Err(DomainError::invalid_operation(
                format!("item '{}' already exists", existing.name()),
            )
            .into()),
            _ => Ok(()),
        }
    }

    pub fn create(
        &mut self,
        caller: &CallerIdentity,
        name: &str,
        stock: i64,
    ) -> Result<Item, LoanError> {
        require_role(caller, Role::Approver)?;
        let item = Item::new(ItemId::new(), name, stock)?;
        self.ensure_name_free(item.name(), None)?;
        self.uow.insert_item(item.clone())?;
        info!(item_id = %item.id(), name = item.name(), stock = item.stock(), "item created");
        Ok(item)
    }

    pub fn update(
        &mut self,
        caller: &CallerIdentity,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<Item, LoanError> {
        require_role(caller, Role::Approver)?;
        let mut item = self.get(id)?;

        if let Some(name) = patch.name {
            item.rename(name)?;
            self.ensure_name_free(item.name(), Some(id))?;
            self.uow.update_item(&item)?;
        }
        if let Some(stock) = patch.stock {
            item = StockLedger::new(&mut *self.uow).set_stock(id, stock)?;
        }
        Ok(item)
    }

    /// Items referenced by any request line cannot be removed.
    pub fn delete(&mut self, caller: &CallerIdentity, id: ItemId) -> Result<(), LoanError> {
        require_role(caller, Role::Approver)?;
        self.get(id)?;
        if self.uow.item_in_use(id)? {
            return Err(DomainError::invalid_operation(
                "cannot delete item: item is used in transactions",
            )
            .into());
        }
        self.uow.delete_item(id)?;
        info!(item_id = %id, "item deleted");
        Ok(())
    }
}
