use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use loantrack_core::{DomainError, DomainResult, ValueObject};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Planned hand-out (`out`) and return (`entry`) dates of a loan.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanDates {
    pub out: Option<NaiveDate>,
    pub entry: Option<NaiveDate>,
}

impl LoanDates {
    /// Parse `YYYY-MM-DD` strings; an empty string leaves the date unset.
    pub fn parse(out: &str, entry: &str) -> DomainResult<Self> {
        Ok(Self {
            out: parse_date("out", out)?,
            entry: parse_date("entry", entry)?,
        })
    }

    /// Fields set in `patch` replace ours; unset fields are kept.
    pub fn patched(self, patch: LoanDates) -> Self {
        Self {
            out: patch.out.or(self.out),
            entry: patch.entry.or(self.entry),
        }
    }
}

impl ValueObject for LoanDates {}

fn parse_date(field: &str, raw: &str) -> DomainResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DomainError::validation(format!("invalid date format for {field}: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_and_blanks() {
        let dates = LoanDates::parse("2024-03-01", "").unwrap();
        assert_eq!(dates.out, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(dates.entry, None);
    }

    #[test]
    fn rejects_other_formats() {
        let err = LoanDates::parse("01/03/2024", "").unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("out")));
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let current = LoanDates::parse("2024-03-01", "2024-03-10").unwrap();
        let patch = LoanDates::parse("", "2024-03-12").unwrap();
        let merged = current.patched(patch);
        assert_eq!(merged.out, current.out);
        assert_eq!(merged.entry, NaiveDate::from_ymd_opt(2024, 3, 12));
    }
}
