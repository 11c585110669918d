//! Debt book record - money borrowed from or lent to a third party.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a debt from the owner's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    /// The owner borrowed money and has to pay it back
    Borrow,
    /// The owner lent money and has to collect it
    Lend,
}

impl DebtKind {
    /// Lowercase label used in logs and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Lend => "lend",
        }
    }
}

/// One entry of a user's debt book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Borrowed or lent
    #[serde(rename = "type")]
    pub kind: DebtKind,
    /// Counterparty
    pub person_name: String,
    /// Principal
    pub amount: i64,
    /// Cumulative amount repaid or collected so far
    pub paid_amount: i64,
    /// Day the debt started
    pub start_date: NaiveDate,
    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Free-text note
    #[serde(default)]
    pub note: String,
    /// Derived: `paid_amount >= amount`
    #[serde(default)]
    pub is_finished: bool,
}

impl DebtRecord {
    /// Recomputes `is_finished` from the amounts. Must run after every change.
    pub fn refresh_status(&mut self) {
        self.is_finished = self.paid_amount >= self.amount;
    }

    /// Amount still outstanding, never below zero.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        (self.amount - self.paid_amount).max(0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn record(amount: i64, paid_amount: i64) -> DebtRecord {
        DebtRecord {
            id: "d1".to_string(),
            user_id: "u1".to_string(),
            kind: DebtKind::Lend,
            person_name: "Minh".to_string(),
            amount,
            paid_amount,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: None,
            note: String::new(),
            is_finished: false,
        }
    }

    #[test]
    fn test_refresh_status_tracks_paid_amount() {
        let mut debt = record(500_000, 200_000);
        debt.refresh_status();
        assert!(!debt.is_finished);

        debt.paid_amount = 500_000;
        debt.refresh_status();
        assert!(debt.is_finished);

        debt.paid_amount = 650_000;
        debt.refresh_status();
        assert!(debt.is_finished);
        assert_eq!(debt.remaining(), 0);
    }

    #[test]
    fn test_kind_serializes_as_type_field() {
        let json = serde_json::to_value(record(10, 0)).unwrap();
        assert_eq!(json["type"], "lend");
        assert_eq!(json["paidAmount"], 0);
    }
}
