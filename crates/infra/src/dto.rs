//! Inputs and views exchanged with callers of the loan core.

use serde::{Deserialize, Serialize};

use loantrack_core::{ItemId, Quantity, UserId};
use loantrack_loans::{Detail, Transaction};

/// Partial update of a catalogue item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub stock: Option<i64>,
}

/// Partial update of an account's profile. Roles are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Partial update of a draft line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub item_id: Option<ItemId>,
    pub quantity: Option<Quantity>,
}

/// A loan batch together with its request lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailView {
    pub detail: Detail,
    pub transactions: Vec<Transaction>,
}

impl DetailView {
    /// Requester who submitted the batch (all lines share one owner).
    pub fn owner(&self) -> Option<UserId> {
        self.transactions.first().map(Transaction::user_id)
    }
}

/// What an account deletion removed or restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeletion {
    pub user_id: UserId,
    /// Units returned to stock per item, from loans still `loaned`.
    pub released: Vec<(ItemId, Quantity)>,
    pub details_deleted: usize,
    pub transactions_deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loantrack_core::{DetailId, TransactionId};
    use loantrack_loans::{DetailCode, LoanDates};

    #[test]
    fn detail_view_serializes_with_wire_names() {
        let user = UserId::new();
        let item = ItemId::new();
        let detail_id = DetailId::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let mut line =
            Transaction::draft(TransactionId::new(), user, item, Quantity::new(2).unwrap());
        line.attach(detail_id).unwrap();
        let view = DetailView {
            detail: Detail::submitted(
                detail_id,
                DetailCode::generate("ivt", at, user),
                LoanDates::parse("2024-01-03", "").unwrap(),
                at,
            ),
            transactions: vec![line],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["detail"]["status"], "pending");
        assert_eq!(json["detail"]["dates"]["out"], "2024-01-03");
        assert!(json["detail"]["dates"]["entry"].is_null());
        assert_eq!(json["transactions"][0]["status"], "pending");
        assert_eq!(json["transactions"][0]["quantity"], 2);
        assert_eq!(view.owner(), Some(user));
    }
}
