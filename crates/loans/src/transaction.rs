use core::str::FromStr;

use serde::{Deserialize, Serialize};

use loantrack_core::{
    DetailId, DomainError, DomainResult, Entity, ItemId, Quantity, TransactionId, UserId,
};

/// Lifecycle of a single item request.
///
/// `draft --attach--> pending --(detail loaned)--> finish`; nothing leaves `finish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Draft,
    Pending,
    Finish,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Draft => "draft",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Finish => "finish",
        }
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TransactionStatus::Draft),
            "pending" => Ok(TransactionStatus::Pending),
            "finish" => Ok(TransactionStatus::Finish),
            other => Err(DomainError::validation(format!(
                "invalid status: {other}, allowed values are: draft, pending, finish"
            ))),
        }
    }
}

/// One user's request for a quantity of one item.
///
/// While `draft` it is a cart line; once attached it belongs to exactly one
/// `Detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    user_id: UserId,
    item_id: ItemId,
    detail_id: Option<DetailId>,
    quantity: Quantity,
    status: TransactionStatus,
}

impl Transaction {
    /// A fresh cart line.
    pub fn draft(id: TransactionId, user_id: UserId, item_id: ItemId, quantity: Quantity) -> Self {
        Self {
            id,
            user_id,
            item_id,
            detail_id: None,
            quantity,
            status: TransactionStatus::Draft,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn detail_id(&self) -> Option<DetailId> {
        self.detail_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.status, TransactionStatus::Draft)
    }

    fn ensure_draft(&self, action: &str) -> DomainResult<()> {
        if self.is_draft() {
            Ok(())
        } else {
            Err(DomainError::invalid_operation(format!(
                "transaction can only be {action} while 'draft' (current: '{}')",
                self.status
            )))
        }
    }

    /// Quantity this line would hold after merging `extra` into it.
    pub fn merged_quantity(&self, extra: Quantity) -> DomainResult<Quantity> {
        self.ensure_draft("merged")?;
        self.quantity.checked_add(extra)
    }

    pub fn set_quantity(&mut self, quantity: Quantity) -> DomainResult<()> {
        self.ensure_draft("updated")?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_item(&mut self, item_id: ItemId) -> DomainResult<()> {
        self.ensure_draft("updated")?;
        self.item_id = item_id;
        Ok(())
    }

    pub fn ensure_removable(&self) -> DomainResult<()> {
        self.ensure_draft("deleted")
    }

    /// `draft -> pending`, binding the line to its loan batch.
    pub fn attach(&mut self, detail_id: DetailId) -> DomainResult<()> {
        if !self.is_draft() {
            return Err(DomainError::invalid_transition(self.status, TransactionStatus::Pending));
        }
        self.detail_id = Some(detail_id);
        self.status = TransactionStatus::Pending;
        Ok(())
    }

    /// `pending -> finish` once the batch is loaned.
    ///
    /// Lines already `finish` stay so: reversing a loan does not reopen them,
    /// and approving the same batch again is a no-op here.
    pub fn finish(&mut self) -> DomainResult<()> {
        match self.status {
            TransactionStatus::Pending | TransactionStatus::Finish => {
                self.status = TransactionStatus::Finish;
                Ok(())
            }
            TransactionStatus::Draft => Err(DomainError::invalid_transition(
                self.status,
                TransactionStatus::Finish,
            )),
        }
    }
}

impl Entity for Transaction {
    type Id = TransactionId;
    const KIND: &'static str = "transaction";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
