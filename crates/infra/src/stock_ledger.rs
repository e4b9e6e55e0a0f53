//! Stock Ledger: the only writer of `Item.stock`.
//!
//! Every mutation reads the item through [`UnitOfWork::item_for_update`], so
//! the row stays locked until the surrounding unit of work commits or rolls
//! back.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use loantrack_core::{Entity, ItemId, Quantity};
use loantrack_inventory::Item;

use crate::error::LoanError;
use crate::store::UnitOfWork;

/// One child line's claim on an item.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub item_id: ItemId,
    pub quantity: Quantity,
}

pub struct StockLedger<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> StockLedger<'u> {
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    fn locked(&mut self, item_id: ItemId) -> Result<Item, LoanError> {
        self.uow
            .item_for_update(item_id)?
            .ok_or_else(|| Item::not_found(&item_id).into())
    }

    /// Read-only sufficiency check (no lock, no reservation).
    pub fn ensure_available(&self, item_id: ItemId, requested: Quantity) -> Result<(), LoanError> {
        let item = self
            .uow
            .item(item_id)?
            .ok_or_else(|| Item::not_found(&item_id))?;
        item.ensure_available(requested)?;
        Ok(())
    }

    /// Decrement stock by `qty`; fails with `InsufficientStock` if it would go negative.
    pub fn reserve(&mut self, item_id: ItemId, qty: Quantity) -> Result<i64, LoanError> {
        let mut item = self.locked(item_id)?;
        item.reserve(qty)?;
        self.uow.update_item(&item)?;
        debug!(item_id = %item_id, quantity = qty.get(), stock = item.stock(), "stock reserved");
        Ok(item.stock())
    }

    /// Increment stock by `qty`.
    pub fn release(&mut self, item_id: ItemId, qty: Quantity) -> Result<i64, LoanError> {
        let mut item = self.locked(item_id)?;
        item.release(qty);
        self.uow.update_item(&item)?;
        debug!(item_id = %item_id, quantity = qty.get(), stock = item.stock(), "stock released");
        Ok(item.stock())
    }

    /// Administrative correction of an item's stock level.
    pub fn set_stock(&mut self, item_id: ItemId, stock: i64) -> Result<Item, LoanError> {
        let mut item = self.locked(item_id)?;
        item.set_stock(stock)?;
        self.uow.update_item(&item)?;
        Ok(item)
    }

    /// Reserve every line or none.
    ///
    /// All items are locked (in id order) and checked against the summed
    /// demand before the first decrement is written.
    pub fn reserve_all(&mut self, lines: &[StockLine]) -> Result<(), LoanError> {
        let demand = sum_by_item(lines)?;

        let mut locked = Vec::with_capacity(demand.len());
        for (item_id, qty) in &demand {
            let item = self.locked(*item_id)?;
            if let Err(err) = item.ensure_available(*qty) {
                warn!(
                    item_id = %item_id,
                    requested = qty.units(),
                    available = item.stock(),
                    "batch reservation refused"
                );
                return Err(err.into());
            }
            locked.push((item, *qty));
        }

        for (mut item, qty) in locked {
            item.reserve(qty)?;
            self.uow.update_item(&item)?;
            debug!(
                item_id = %item.id(),
                quantity = qty.get(),
                stock = item.stock(),
                "stock reserved"
            );
        }
        Ok(())
    }

    /// Release every line.
    pub fn release_all(&mut self, lines: &[StockLine]) -> Result<(), LoanError> {
        for (item_id, qty) in sum_by_item(lines)? {
            self.release(item_id, qty)?;
        }
        Ok(())
    }
}

fn sum_by_item(lines: &[StockLine]) -> Result<BTreeMap<ItemId, Quantity>, LoanError> {
    let mut demand: BTreeMap<ItemId, Quantity> = BTreeMap::new();
    for line in lines {
        let total = match demand.get(&line.item_id) {
            Some(existing) => existing.checked_add(line.quantity)?,
            None => line.quantity,
        };
        demand.insert(line.item_id, total);
    }
    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryLoanStore, LoanStore};

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn store_with(stocks: &[(&str, i64)]) -> (InMemoryLoanStore, Vec<ItemId>) {
        let store = InMemoryLoanStore::new();
        let ids: Vec<ItemId> = stocks.iter().map(|_| ItemId::new()).collect();
        store
            .unit_of_work(|uow| {
                for ((name, stock), id) in stocks.iter().zip(&ids) {
                    uow.insert_item(Item::new(*id, *name, *stock)?)?;
                }
                Ok(())
            })
            .unwrap();
        (store, ids)
    }

    fn stock(store: &InMemoryLoanStore, id: ItemId) -> i64 {
        store
            .unit_of_work(|uow| Ok(uow.item(id)?.map(|i| i.stock()).unwrap_or(-1)))
            .unwrap()
    }

    #[test]
    fn reserve_then_release_nets_to_zero() {
        let (store, ids) = store_with(&[("widget", 10)]);
        store
            .unit_of_work(|uow| {
                let mut ledger = StockLedger::new(uow);
                assert_eq!(ledger.reserve(ids[0], qty(6))?, 4);
                assert_eq!(ledger.release(ids[0], qty(6))?, 10);
                Ok(())
            })
            .unwrap();
        assert_eq!(stock(&store, ids[0]), 10);
    }

    #[test]
    fn reserve_missing_item_is_not_found() {
        let (store, _) = store_with(&[]);
        let err = store
            .unit_of_work(|uow| StockLedger::new(uow).reserve(ItemId::new(), qty(1)))
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn reserve_all_is_all_or_nothing() {
        let (store, ids) = store_with(&[("cable", 5), ("lamp", 1)]);
        let lines = [
            StockLine { item_id: ids[0], quantity: qty(3) },
            StockLine { item_id: ids[1], quantity: qty(2) },
        ];

        let err = store
            .unit_of_work(|uow| StockLedger::new(uow).reserve_all(&lines))
            .unwrap_err();
        assert_eq!(
            err,
            LoanError::InsufficientStock {
                item: "lamp".to_string(),
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(stock(&store, ids[0]), 5);
        assert_eq!(stock(&store, ids[1]), 1);
    }

    #[test]
    fn reserve_all_sums_lines_for_the_same_item() {
        let (store, ids) = store_with(&[("cable", 5)]);
        let lines = [
            StockLine { item_id: ids[0], quantity: qty(3) },
            StockLine { item_id: ids[0], quantity: qty(3) },
        ];
        let err = store
            .unit_of_work(|uow| StockLedger::new(uow).reserve_all(&lines))
            .unwrap_err();
        assert!(matches!(err, LoanError::InsufficientStock { requested: 6, available: 5, .. }));
    }

    #[test]
    fn ensure_available_does_not_touch_stock() {
        let (store, ids) = store_with(&[("widget", 3)]);
        let err = store
            .unit_of_work(|uow| StockLedger::new(uow).ensure_available(ids[0], qty(5)))
            .unwrap_err();
        assert!(matches!(err, LoanError::InsufficientStock { requested: 5, available: 3, .. }));
        assert_eq!(stock(&store, ids[0]), 3);
    }
}
