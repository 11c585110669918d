//! Fund expenses - per-user spending entries. Created or deleted, never edited.

use crate::{
    core::state::AppState,
    errors::{Error, Result},
    models::{ExpenseRecord, new_id},
};
use chrono::NaiveDate;

/// Input for a new expense; the owner comes from the acting session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    /// Day the money was spent
    pub date: NaiveDate,
    /// Short title
    pub title: String,
    /// Amount spent, never negative
    pub amount: i64,
    /// Optional note
    pub note: Option<String>,
}

/// Records an expense owned by `user_id`.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty title and [`Error::InvalidAmount`]
/// for a negative amount.
pub fn add_expense(
    state: &mut AppState,
    user_id: &str,
    input: NewExpense,
) -> Result<ExpenseRecord> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(Error::Validation {
            message: "Expense title cannot be empty".to_string(),
        });
    }
    if input.amount < 0 {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    let record = ExpenseRecord {
        id: new_id(),
        user_id: user_id.to_string(),
        date: input.date,
        title: title.to_string(),
        amount: input.amount,
        note: input.note.filter(|note| !note.trim().is_empty()),
    };
    state.expense_records.push(record.clone());
    Ok(record)
}

/// Finds an expense by id.
#[must_use]
pub fn find_expense<'a>(state: &'a AppState, expense_id: &str) -> Option<&'a ExpenseRecord> {
    state
        .expense_records
        .iter()
        .find(|record| record.id == expense_id)
}

/// Deletes an expense.
///
/// # Errors
/// Returns [`Error::RecordNotFound`] if the id is unknown.
pub fn remove_expense(state: &mut AppState, expense_id: &str) -> Result<ExpenseRecord> {
    let index = state
        .expense_records
        .iter()
        .position(|record| record.id == expense_id)
        .ok_or_else(|| Error::RecordNotFound {
            id: expense_id.to_string(),
        })?;
    Ok(state.expense_records.remove(index))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn input(title: &str, amount: i64) -> NewExpense {
        NewExpense {
            date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            title: title.to_string(),
            amount,
            note: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_add_expense_sets_owner() {
        let mut state = AppState::default();
        let record = add_expense(&mut state, "u1", input(" Coffee ", 25_000)).unwrap();
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.title, "Coffee");
        assert_eq!(record.note, None);
        assert_eq!(find_expense(&state, &record.id), Some(&record));
    }

    #[test]
    fn test_add_expense_validation() {
        let mut state = AppState::default();
        assert!(matches!(
            add_expense(&mut state, "u1", input("", 10)),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            add_expense(&mut state, "u1", input("Tea", -5)),
            Err(Error::InvalidAmount { amount: -5 })
        ));
        assert!(state.expense_records.is_empty());
    }

    #[test]
    fn test_remove_expense() {
        let mut state = AppState::default();
        let record = add_expense(&mut state, "u1", input("Snacks", 50_000)).unwrap();
        let removed = remove_expense(&mut state, &record.id).unwrap();
        assert_eq!(removed, record);
        assert!(matches!(
            remove_expense(&mut state, &record.id),
            Err(Error::RecordNotFound { .. })
        ));
    }
}
