//! Balance reconciliation - keeps every employee balance in step with lunch charges and credits.
//!
//! A balance is the sum of every credit minus every charge ever applied to an
//! employee. When the lunch list of a day changes, each employee's balance moves
//! by the signed difference between the old and the new price for that day,
//! computed in one pass over both lists. Applying the same list twice is
//! therefore a no-op, and an employee present in both lists is never refunded
//! and charged as two separate steps.

use crate::{
    core::state::AppState,
    errors::{Error, Result},
    models::{Employee, LunchItem, LunchRecord},
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Change applied to one employee balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceDelta {
    /// Employee whose balance moved
    pub employee_id: String,
    /// Signed amount added to the balance
    pub delta: i64,
    /// Balance after the change
    pub new_balance: i64,
}

/// What a lunch update did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LunchUpdate {
    /// Day that was updated
    pub date: NaiveDate,
    /// Non-zero balance changes, in employee order
    pub deltas: Vec<BalanceDelta>,
    /// Items that reference no known employee; stored verbatim, charged to nobody
    pub orphaned: Vec<String>,
    /// Whether the day is now stored (false when the new list was empty)
    pub stored: bool,
}

impl LunchUpdate {
    /// Whether any balance changed.
    #[must_use]
    pub fn changed_balances(&self) -> bool {
        !self.deltas.is_empty()
    }
}

/// Checks a lunch list before anything is mutated.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for a negative price and [`Error::Validation`]
/// when the same employee appears twice.
pub fn validate_items(items: &[LunchItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.price < 0 {
            return Err(Error::InvalidAmount { amount: item.price });
        }
        if !seen.insert(item.employee_id.as_str()) {
            return Err(Error::Validation {
                message: format!(
                    "employee {} appears more than once on the same day",
                    item.employee_id
                ),
            });
        }
    }
    Ok(())
}

/// Replaces the lunch list of `date` with `new_items` and reconciles balances.
///
/// For every employee, `delta = old_price - new_price` (a missing item counts
/// as 0) is added to the balance. The new record is stored afterwards; an empty
/// list removes the day instead of storing an empty record.
///
/// # Errors
/// Fails validation before touching any state; see [`validate_items`]. Returns
/// [`Error::InvalidAmount`] when a balance would overflow, also before any change.
pub fn apply_lunch_update(
    state: &mut AppState,
    date: NaiveDate,
    new_items: Vec<LunchItem>,
) -> Result<LunchUpdate> {
    validate_items(&new_items)?;

    let previous_index = state.lunch_records.iter().position(|r| r.date == date);

    let old_prices: HashMap<&str, i64> = previous_index
        .map(|index| {
            state.lunch_records[index]
                .items
                .iter()
                .map(|item| (item.employee_id.as_str(), item.price))
                .collect()
        })
        .unwrap_or_default();
    let new_prices: HashMap<&str, i64> = new_items
        .iter()
        .map(|item| (item.employee_id.as_str(), item.price))
        .collect();

    let mut deltas = Vec::new();
    let mut balance_changes = Vec::new();
    for (index, employee) in state.employees.iter().enumerate() {
        let old = old_prices.get(employee.id.as_str()).copied().unwrap_or(0);
        let new = new_prices.get(employee.id.as_str()).copied().unwrap_or(0);
        let delta = old - new;
        if delta != 0 {
            let new_balance = checked_balance(employee, delta)?;
            balance_changes.push((index, delta, new_balance));
        }
    }

    let orphaned: Vec<String> = new_items
        .iter()
        .filter(|item| state.employee(&item.employee_id).is_none())
        .map(|item| item.employee_id.clone())
        .collect();

    for (index, delta, new_balance) in balance_changes {
        let employee = &mut state.employees[index];
        employee.balance = new_balance;
        deltas.push(BalanceDelta {
            employee_id: employee.id.clone(),
            delta,
            new_balance: employee.balance,
        });
    }

    for employee_id in &orphaned {
        tracing::debug!(
            %date,
            employee_id = employee_id.as_str(),
            "Lunch item references an unknown employee"
        );
    }

    let stored = !new_items.is_empty();
    match (previous_index, stored) {
        (Some(index), true) => state.lunch_records[index].items = new_items,
        (Some(index), false) => {
            state.lunch_records.remove(index);
        }
        (None, true) => state.lunch_records.push(LunchRecord {
            date,
            items: new_items,
        }),
        (None, false) => {}
    }

    Ok(LunchUpdate {
        date,
        deltas,
        orphaned,
        stored,
    })
}

fn checked_balance(employee: &Employee, delta: i64) -> Result<i64> {
    employee
        .balance
        .checked_add(delta)
        .ok_or(Error::InvalidAmount { amount: delta })
}

/// Adds a signed `amount` to an employee's balance.
///
/// Used for manual adjustments (any sign) and confirmed payments (positive).
/// Returns the updated employee, or `None` when the id is unknown, in which case
/// nothing changes.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] when the new balance would not fit in an
/// `i64`; the balance is left as it was.
pub fn apply_credit<'a>(
    employees: &'a mut [Employee],
    employee_id: &str,
    amount: i64,
) -> Result<Option<&'a Employee>> {
    let Some(employee) = employees.iter_mut().find(|e| e.id == employee_id) else {
        return Ok(None);
    };
    employee.balance = checked_balance(employee, amount)?;
    Ok(Some(employee))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn employee(id: &str, balance: i64) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_uppercase(),
            balance,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn state_with(employees: Vec<Employee>) -> AppState {
        AppState {
            employees,
            ..AppState::default()
        }
    }

    fn balance(state: &AppState, id: &str) -> i64 {
        state.employee(id).unwrap().balance
    }

    #[test]
    fn test_reconciliation_scenario() {
        let mut state = state_with(vec![employee("a", 0), employee("b", 0)]);

        apply_lunch_update(
            &mut state,
            day(6),
            vec![LunchItem::new("a", 30_000), LunchItem::new("b", 30_000)],
        )
        .unwrap();
        assert_eq!(balance(&state, "a"), -30_000);
        assert_eq!(balance(&state, "b"), -30_000);

        let update =
            apply_lunch_update(&mut state, day(6), vec![LunchItem::new("a", 35_000)]).unwrap();
        assert_eq!(balance(&state, "a"), -35_000);
        assert_eq!(balance(&state, "b"), 0);
        assert_eq!(update.deltas.len(), 2);
        assert_eq!(update.deltas[0].delta, -5_000);
        assert_eq!(update.deltas[1].delta, 30_000);
    }

    #[test]
    fn test_same_list_twice_is_noop() {
        let mut state = state_with(vec![employee("a", 10_000), employee("b", 0)]);
        let items = vec![LunchItem::new("a", 35_000), LunchItem::new("b", 40_000)];

        apply_lunch_update(&mut state, day(2), items.clone()).unwrap();
        let after_first = state.employees.clone();

        let second = apply_lunch_update(&mut state, day(2), items).unwrap();
        assert!(!second.changed_balances());
        assert_eq!(state.employees, after_first);
    }

    #[test]
    fn test_net_change_is_price_difference() {
        let mut state = state_with(vec![employee("a", 0)]);
        let lists = [
            vec![LunchItem::new("a", 30_000)],
            vec![LunchItem::new("a", 45_000)],
            vec![LunchItem::new("a", 20_000)],
            Vec::new(),
            vec![LunchItem::new("a", 35_000)],
        ];

        let mut previous_price = 0;
        for list in lists {
            let before = balance(&state, "a");
            let price = list.first().map_or(0, |item| item.price);
            apply_lunch_update(&mut state, day(9), list).unwrap();
            assert_eq!(balance(&state, "a"), before + previous_price - price);
            previous_price = price;
        }
    }

    #[test]
    fn test_empty_list_deletes_record() {
        let mut state = state_with(vec![employee("a", 0)]);
        apply_lunch_update(&mut state, day(3), vec![LunchItem::new("a", 35_000)]).unwrap();
        assert!(state.lunch_record(day(3)).is_some());

        let update = apply_lunch_update(&mut state, day(3), Vec::new()).unwrap();
        assert!(!update.stored);
        assert!(state.lunch_record(day(3)).is_none());
        assert!(state.lunch_records.is_empty());
        assert_eq!(balance(&state, "a"), 0);
    }

    #[test]
    fn test_empty_list_on_empty_day_stores_nothing() {
        let mut state = state_with(vec![employee("a", 0)]);
        let update = apply_lunch_update(&mut state, day(4), Vec::new()).unwrap();
        assert!(!update.stored);
        assert!(state.lunch_records.is_empty());
    }

    #[test]
    fn test_other_days_untouched() {
        let mut state = state_with(vec![employee("a", 0)]);
        apply_lunch_update(&mut state, day(1), vec![LunchItem::new("a", 30_000)]).unwrap();
        apply_lunch_update(&mut state, day(2), vec![LunchItem::new("a", 30_000)]).unwrap();
        apply_lunch_update(&mut state, day(2), Vec::new()).unwrap();

        assert_eq!(state.lunch_records.len(), 1);
        assert_eq!(state.lunch_records[0].date, day(1));
        assert_eq!(balance(&state, "a"), -30_000);
    }

    #[test]
    fn test_unknown_employee_item_is_stored_but_not_charged() {
        let mut state = state_with(vec![employee("a", 0)]);
        let update = apply_lunch_update(
            &mut state,
            day(7),
            vec![LunchItem::new("a", 35_000), LunchItem::new("ghost", 35_000)],
        )
        .unwrap();

        assert_eq!(update.orphaned, vec!["ghost".to_string()]);
        assert_eq!(balance(&state, "a"), -35_000);
        let record = state.lunch_record(day(7)).unwrap();
        assert!(record.item_for("ghost").is_some());
    }

    #[test]
    fn test_invalid_items_leave_state_untouched() {
        let mut state = state_with(vec![employee("a", 0)]);
        apply_lunch_update(&mut state, day(8), vec![LunchItem::new("a", 35_000)]).unwrap();
        let before = state.clone();

        let negative = apply_lunch_update(&mut state, day(8), vec![LunchItem::new("a", -1)]);
        assert!(matches!(negative, Err(Error::InvalidAmount { amount: -1 })));

        let duplicate = apply_lunch_update(
            &mut state,
            day(8),
            vec![LunchItem::new("a", 1), LunchItem::new("a", 2)],
        );
        assert!(matches!(duplicate, Err(Error::Validation { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_credit() {
        let mut employees = vec![employee("a", -35_000), employee("b", 0)];

        let updated = apply_credit(&mut employees, "a", 50_000).unwrap().unwrap();
        assert_eq!(updated.balance, 15_000);

        let adjusted = apply_credit(&mut employees, "b", -12_000).unwrap().unwrap();
        assert_eq!(adjusted.balance, -12_000);
    }

    #[test]
    fn test_apply_credit_unknown_employee_is_noop() {
        let mut employees = vec![employee("a", 5)];
        assert!(apply_credit(&mut employees, "missing", 100).unwrap().is_none());
        assert_eq!(employees[0].balance, 5);
    }

    #[test]
    fn test_apply_credit_rejects_overflow() {
        let mut employees = vec![employee("a", i64::MAX - 1), employee("b", i64::MIN + 1)];

        assert!(matches!(
            apply_credit(&mut employees, "a", 10),
            Err(Error::InvalidAmount { amount: 10 })
        ));
        assert!(matches!(
            apply_credit(&mut employees, "b", -10),
            Err(Error::InvalidAmount { amount: -10 })
        ));
        assert_eq!(employees[0].balance, i64::MAX - 1);
        assert_eq!(employees[1].balance, i64::MIN + 1);
    }

    #[test]
    fn test_lunch_update_overflow_leaves_state_untouched() {
        let mut state = state_with(vec![employee("a", 0), employee("b", i64::MIN + 5)]);
        let before = state.clone();

        let result = apply_lunch_update(
            &mut state,
            day(10),
            vec![LunchItem::new("a", 35_000), LunchItem::new("b", 10)],
        );
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -10 })));
        assert_eq!(state, before);
    }
}
