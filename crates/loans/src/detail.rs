use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loantrack_core::{DetailId, DomainError, DomainResult, Entity, UserId};

use crate::LoanDates;

/// Approval status of a loan batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailStatus {
    Pending,
    Loaned,
    Return,
    Rejected,
}

/// Stock movement a status edge triggers for every child line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Take each child's quantity out of stock (all children or none).
    Reserve,
    /// Put each child's quantity back.
    Release,
}

/// A legal status edge together with its preconditions and side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: DetailStatus,
    pub to: DetailStatus,
    pub effect: StockEffect,
    /// When false, the owning requester may take the edge as well.
    pub approver_only: bool,
}

impl DetailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailStatus::Pending => "pending",
            DetailStatus::Loaned => "loaned",
            DetailStatus::Return => "return",
            DetailStatus::Rejected => "rejected",
        }
    }

    /// Look up the edge `self -> to`.
    ///
    /// Any pair not listed here is an `InvalidTransition`, including
    /// self-loops and every edge out of `return`.
    pub fn plan_transition(self, to: DetailStatus) -> DomainResult<StatusTransition> {
        use DetailStatus::*;

        let (effect, approver_only) = match (self, to) {
            (Pending, Loaned) => (StockEffect::Reserve, true),
            (Pending, Rejected) => (StockEffect::None, true),
            (Loaned, Return) | (Loaned, Pending) | (Loaned, Rejected) => {
                (StockEffect::Release, true)
            }
            (Rejected, Pending) => (StockEffect::None, false),
            _ => return Err(DomainError::invalid_transition(self, to)),
        };

        Ok(StatusTransition {
            from: self,
            to,
            effect,
            approver_only,
        })
    }

    /// Details may only be destroyed before stock is committed or after rejection.
    pub fn is_deletable(&self) -> bool {
        matches!(self, DetailStatus::Pending | DetailStatus::Rejected)
    }
}

impl core::fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DetailStatus::Pending),
            "loaned" => Ok(DetailStatus::Loaned),
            "return" => Ok(DetailStatus::Return),
            "rejected" => Ok(DetailStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "invalid status: {other}, allowed values are: pending, loaned, return, rejected"
            ))),
        }
    }
}

/// Human-facing loan code: prefix, minute+second of submission, requester id.
///
/// Not guaranteed unique: two submissions by the same user within the same
/// second of an hour produce the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailCode(String);

impl DetailCode {
    pub fn generate(prefix: &str, at: DateTime<Utc>, requester: UserId) -> Self {
        Self(format!(
            "{prefix}{}{}",
            at.format("%M%S"),
            requester.as_uuid().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DetailCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loan batch: the approval unit for a set of request lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    id: DetailId,
    code: DetailCode,
    dates: LoanDates,
    status: DetailStatus,
    requested_at: DateTime<Utc>,
}

impl Detail {
    /// A freshly submitted batch (always `pending`).
    pub fn submitted(
        id: DetailId,
        code: DetailCode,
        dates: LoanDates,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            dates,
            status: DetailStatus::Pending,
            requested_at,
        }
    }

    pub fn code(&self) -> &DetailCode {
        &self.code
    }

    pub fn dates(&self) -> LoanDates {
        self.dates
    }

    pub fn status(&self) -> DetailStatus {
        self.status
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn plan_transition(&self, to: DetailStatus) -> DomainResult<StatusTransition> {
        self.status.plan_transition(to)
    }

    /// Commit a planned edge. The plan must have been made from the current status.
    pub fn apply_transition(&mut self, transition: &StatusTransition) -> DomainResult<()> {
        if transition.from != self.status {
            return Err(DomainError::invalid_transition(self.status, transition.to));
        }
        self.status = transition.to;
        Ok(())
    }

    /// Requesters may move their dates only while the batch awaits approval.
    pub fn edit_dates(&mut self, patch: LoanDates) -> DomainResult<()> {
        if self.status != DetailStatus::Pending {
            return Err(DomainError::invalid_operation(format!(
                "dates can only be changed while 'pending' (current: '{}')",
                self.status
            )));
        }
        self.dates = self.dates.patched(patch);
        Ok(())
    }

    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status.is_deletable() {
            Ok(())
        } else {
            Err(DomainError::invalid_operation(format!(
                "cannot delete detail: status must be pending or rejected (current: '{}')",
                self.status
            )))
        }
    }
}

impl Entity for Detail {
    type Id = DetailId;
    const KIND: &'static str = "detail";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ALL: [DetailStatus; 4] = [
        DetailStatus::Pending,
        DetailStatus::Loaned,
        DetailStatus::Return,
        DetailStatus::Rejected,
    ];

    fn pending_detail() -> Detail {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        Detail::submitted(
            DetailId::new(),
            DetailCode::generate("ivt", at, UserId::new()),
            LoanDates::default(),
            at,
        )
    }

    #[test]
    fn transition_table_matches_the_lifecycle() {
        use DetailStatus::*;

        let legal = [
            (Pending, Loaned, StockEffect::Reserve, true),
            (Pending, Rejected, StockEffect::None, true),
            (Loaned, Return, StockEffect::Release, true),
            (Loaned, Pending, StockEffect::Release, true),
            (Loaned, Rejected, StockEffect::Release, true),
            (Rejected, Pending, StockEffect::None, false),
        ];

        for from in ALL {
            for to in ALL {
                let planned = from.plan_transition(to);
                match legal.iter().find(|(f, t, _, _)| *f == from && *t == to) {
                    Some((_, _, effect, approver_only)) => {
                        let t = planned.unwrap();
                        assert_eq!(t.effect, *effect, "{from} -> {to}");
                        assert_eq!(t.approver_only, *approver_only, "{from} -> {to}");
                    }
                    None => assert_eq!(
                        planned,
                        Err(DomainError::invalid_transition(from, to)),
                        "{from} -> {to} should be rejected"
                    ),
                }
            }
        }
    }

    #[test]
    fn apply_rejects_stale_plans() {
        let mut detail = pending_detail();
        let approve = detail.plan_transition(DetailStatus::Loaned).unwrap();
        detail.apply_transition(&approve).unwrap();
        assert_eq!(detail.status(), DetailStatus::Loaned);

        assert!(detail.apply_transition(&approve).is_err());
    }

    #[test]
    fn dates_editable_only_while_pending() {
        let mut detail = pending_detail();
        let patch = LoanDates::parse("2024-05-02", "2024-05-09").unwrap();
        detail.edit_dates(patch).unwrap();
        assert_eq!(detail.dates(), patch);

        let reject = detail.plan_transition(DetailStatus::Rejected).unwrap();
        detail.apply_transition(&reject).unwrap();
        assert!(matches!(
            detail.edit_dates(LoanDates::default()),
            Err(DomainError::InvalidOperation(_))
        ));
    }

    #[test]
    fn loaned_details_cannot_be_deleted() {
        let mut detail = pending_detail();
        detail.ensure_deletable().unwrap();

        let approve = detail.plan_transition(DetailStatus::Loaned).unwrap();
        detail.apply_transition(&approve).unwrap();
        assert!(matches!(detail.ensure_deletable(), Err(DomainError::InvalidOperation(_))));
    }

    #[test]
    fn code_uses_minute_second_and_requester() {
        let user = UserId::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        let code = DetailCode::generate("ivt", at, user);
        assert_eq!(code.as_str(), format!("ivt0703{}", user.as_uuid().simple()));

        let same_second_next_hour = Utc.with_ymd_and_hms(2024, 5, 1, 10, 7, 3).unwrap();
        assert_eq!(DetailCode::generate("ivt", same_second_next_hour, user), code);
    }

    #[test]
    fn status_wire_names() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<DetailStatus>().unwrap(), status);
        }
    }
}
