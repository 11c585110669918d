//! Debt book - money a user borrowed from or lent to someone outside the ledger.
//!
//! `is_finished` is derived from the amounts and is recomputed after every change.

use crate::{
    core::state::AppState,
    errors::{Error, Result},
    models::{DebtKind, DebtRecord, new_id},
};
use chrono::NaiveDate;

/// Input for a new debt entry; the owner comes from the acting session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDebt {
    /// Borrowed or lent
    pub kind: DebtKind,
    /// Counterparty
    pub person_name: String,
    /// Principal
    pub amount: i64,
    /// Already repaid or collected
    pub paid_amount: i64,
    /// Start day
    pub start_date: NaiveDate,
    /// Optional due day
    pub due_date: Option<NaiveDate>,
    /// Free-text note
    pub note: String,
}

/// Replacement values for an existing entry. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtUpdate {
    /// New counterparty
    pub person_name: Option<String>,
    /// New principal
    pub amount: Option<i64>,
    /// New cumulative paid amount
    pub paid_amount: Option<i64>,
    /// New start day
    pub start_date: Option<NaiveDate>,
    /// New due day; `Some(None)` clears it
    pub due_date: Option<Option<NaiveDate>>,
    /// New note
    pub note: Option<String>,
}

fn check_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn check_person(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Person name cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Adds a debt entry owned by `user_id`.
///
/// # Errors
/// Returns a validation error for an empty name or a negative amount.
pub fn add_debt(state: &mut AppState, user_id: &str, input: NewDebt) -> Result<DebtRecord> {
    check_person(&input.person_name)?;
    check_amount(input.amount)?;
    check_amount(input.paid_amount)?;

    let mut record = DebtRecord {
        id: new_id(),
        user_id: user_id.to_string(),
        kind: input.kind,
        person_name: input.person_name.trim().to_string(),
        amount: input.amount,
        paid_amount: input.paid_amount,
        start_date: input.start_date,
        due_date: input.due_date,
        note: input.note,
        is_finished: false,
    };
    record.refresh_status();
    state.debt_records.push(record.clone());
    Ok(record)
}

/// Finds a debt entry by id.
#[must_use]
pub fn find_debt<'a>(state: &'a AppState, debt_id: &str) -> Option<&'a DebtRecord> {
    state.debt_records.iter().find(|record| record.id == debt_id)
}

fn find_debt_mut<'a>(state: &'a mut AppState, debt_id: &str) -> Result<&'a mut DebtRecord> {
    state
        .debt_records
        .iter_mut()
        .find(|record| record.id == debt_id)
        .ok_or_else(|| Error::RecordNotFound {
            id: debt_id.to_string(),
        })
}

/// Applies `update` to an entry and recomputes `is_finished`.
///
/// # Errors
/// Returns [`Error::RecordNotFound`] for an unknown id and a validation error
/// for bad values; nothing is changed on error.
pub fn update_debt(state: &mut AppState, debt_id: &str, update: DebtUpdate) -> Result<DebtRecord> {
    if let Some(name) = &update.person_name {
        check_person(name)?;
    }
    if let Some(amount) = update.amount {
        check_amount(amount)?;
    }
    if let Some(paid) = update.paid_amount {
        check_amount(paid)?;
    }

    let record = find_debt_mut(state, debt_id)?;
    if let Some(name) = update.person_name {
        record.person_name = name.trim().to_string();
    }
    if let Some(amount) = update.amount {
        record.amount = amount;
    }
    if let Some(paid) = update.paid_amount {
        record.paid_amount = paid;
    }
    if let Some(start_date) = update.start_date {
        record.start_date = start_date;
    }
    if let Some(due_date) = update.due_date {
        record.due_date = due_date;
    }
    if let Some(note) = update.note {
        record.note = note;
    }
    record.refresh_status();
    Ok(record.clone())
}

/// Adds a repayment (or collection) to the cumulative paid amount.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] unless `amount` is positive or when the
/// paid total would overflow, and [`Error::RecordNotFound`] for an unknown id.
pub fn record_repayment(state: &mut AppState, debt_id: &str, amount: i64) -> Result<DebtRecord> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let record = find_debt_mut(state, debt_id)?;
    record.paid_amount = record
        .paid_amount
        .checked_add(amount)
        .ok_or(Error::InvalidAmount { amount })?;
    record.refresh_status();
    Ok(record.clone())
}

/// Deletes a debt entry.
///
/// # Errors
/// Returns [`Error::RecordNotFound`] if the id is unknown.
pub fn remove_debt(state: &mut AppState, debt_id: &str) -> Result<DebtRecord> {
    let index = state
        .debt_records
        .iter()
        .position(|record| record.id == debt_id)
        .ok_or_else(|| Error::RecordNotFound {
            id: debt_id.to_string(),
        })?;
    Ok(state.debt_records.remove(index))
}
