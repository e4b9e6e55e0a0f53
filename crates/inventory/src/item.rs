use serde::{Deserialize, Serialize};

use loantrack_core::{DomainError, DomainResult, Entity, ItemId, Quantity};

/// A stocked item that can be lent out.
///
/// `stock >= 0` holds for every value reachable through this API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    stock: i64,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, stock: i64) -> DomainResult<Self> {
        let name = normalize_name(name.into())?;
        ensure_non_negative(stock)?;
        Ok(Self { id, name, stock })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.name = normalize_name(name.into())?;
        Ok(())
    }

    /// Administrative stock correction.
    pub fn set_stock(&mut self, stock: i64) -> DomainResult<()> {
        ensure_non_negative(stock)?;
        self.stock = stock;
        Ok(())
    }

    /// Read-only sufficiency check.
    pub fn ensure_available(&self, requested: Quantity) -> DomainResult<()> {
        if requested.units() > self.stock {
            return Err(DomainError::insufficient_stock(
                self.name.clone(),
                requested.units(),
                self.stock,
            ));
        }
        Ok(())
    }

    /// Take `qty` units out of stock.
    pub fn reserve(&mut self, qty: Quantity) -> DomainResult<()> {
        self.ensure_available(qty)?;
        self.stock -= qty.units();
        Ok(())
    }

    /// Put `qty` units back. No upper bound is enforced.
    pub fn release(&mut self, qty: Quantity) {
        self.stock = self.stock.saturating_add(qty.units());
    }
}

impl Entity for Item {
    type Id = ItemId;
    const KIND: &'static str = "item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn normalize_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn ensure_non_negative(stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    Ok(())
}
