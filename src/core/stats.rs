//! Monthly statistics business logic
//!
//! Read-only views derived from the raw record lists. Every function here is
//! pure: it borrows the records, never mutates them, and returns owned results
//! that the bot layer formats.
//!
//! Two different week partitions are used on purpose:
//! * lunch statistics use calendar weeks that end on Sunday, clipped to the
//!   month at both ends;
//! * expense statistics use fixed seven-day chunks from day 1
//!   (`ceil(day / 7)`), giving at most five buckets.

use crate::{
    core::calendar::YearMonth,
    models::{DebtKind, DebtRecord, Employee, ExpenseRecord, LunchRecord},
};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// A lunch-statistics week inside one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekRange {
    /// 1-based position inside the month
    pub index: u32,
    /// First day of the bucket
    pub start: NaiveDate,
    /// Last day of the bucket (a Sunday, or the last day of the month)
    pub end: NaiveDate,
}

impl WeekRange {
    /// Display label such as `3/6 - 9/6`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{} - {}/{}",
            self.start.day(),
            self.start.month(),
            self.end.day(),
            self.end.month()
        )
    }

    /// Whether `date` falls inside this bucket.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Per-employee lunch spend for one week.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklySpend {
    /// The week
    pub week: WeekRange,
    /// Sum of item prices keyed by employee id (orphaned ids included)
    pub employee_spending: BTreeMap<String, i64>,
}

impl WeeklySpend {
    /// Total spend of the week.
    #[must_use]
    pub fn total(&self) -> i64 {
        saturating_total(self.employee_spending.values().copied())
    }
}

/// One meal in an employee's monthly history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MealEntry {
    /// Day of the meal
    pub date: NaiveDate,
    /// Price charged
    pub price: i64,
    /// Optional note
    pub note: Option<String>,
}

/// Monthly statistics for one employee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeStats {
    /// The employee, as currently stored
    pub employee: Employee,
    /// Number of meals in the month
    pub meal_count: usize,
    /// Sum of meal prices in the month
    pub total_meal_cost: i64,
    /// Meals sorted newest first
    pub history: Vec<MealEntry>,
}

/// Employee overview of one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyOverview {
    /// Month the overview covers
    pub month: YearMonth,
    /// Employees sorted by `total_meal_cost`, highest first
    pub employees: Vec<EmployeeStats>,
    /// Sum of the meal costs of every listed employee
    pub total_spent: i64,
}

/// One `ceil(day / 7)` expense bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseWeek {
    /// Bucket number, 1..=5
    pub week: u32,
    /// Sum of amounts in the bucket
    pub total: i64,
    /// Expenses in the bucket, in stored order
    pub items: Vec<ExpenseRecord>,
}

/// Expense statistics of one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseSummary {
    /// Month the summary covers
    pub month: YearMonth,
    /// Sum of every expense in the month
    pub total: i64,
    /// Non-empty buckets in ascending order
    pub weeks: Vec<ExpenseWeek>,
}

/// One user's debt entries of one kind, with totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebtSummary {
    /// Borrowed or lent
    pub kind: DebtKind,
    /// Entries sorted by start date, newest first
    pub records: Vec<DebtRecord>,
    /// Sum of principals
    pub total_amount: i64,
    /// Sum of paid amounts
    pub total_paid: i64,
}

impl DebtSummary {
    /// Principal still outstanding across all listed entries.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.total_amount.saturating_sub(self.total_paid)
    }
}

/// Borrow and lend totals for debts started in one month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthlyDebtTotals {
    /// Principal borrowed
    pub borrowed: i64,
    /// Principal lent
    pub lent: i64,
}

/// A lunch item whose employee no longer exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrphanedItem {
    /// Day of the item
    pub date: NaiveDate,
    /// Unknown employee id
    pub employee_id: String,
    /// Price stored with the item
    pub price: i64,
}

/// Lunch records whose date falls in `month`.
pub fn lunch_records_in_month(
    records: &[LunchRecord],
    month: YearMonth,
) -> impl Iterator<Item = &LunchRecord> {
    records.iter().filter(move |record| month.contains(record.date))
}

/// Splits `month` into calendar weeks ending on Sunday.
///
/// The first week starts on day 1 and the last one ends on the last day of
/// the month, whatever weekday those are.
#[must_use]
pub fn lunch_weeks(month: YearMonth) -> Vec<WeekRange> {
    let last_day = month.days_in_month();
    let mut weeks = Vec::new();
    let mut start = month.first_day();

    for date in month.days() {
        if date.weekday() == Weekday::Sun || date.day() == last_day {
            weeks.push(WeekRange {
                index: u32::try_from(weeks.len()).unwrap_or(u32::MAX) + 1,
                start,
                end: date,
            });
            start = date.succ_opt().unwrap_or(date);
        }
    }

    weeks
}

/// Per-employee lunch spend for every week of `month` that has at least one item.
#[must_use]
pub fn weekly_lunch_spend(records: &[LunchRecord], month: YearMonth) -> Vec<WeeklySpend> {
    lunch_weeks(month)
        .into_iter()
        .filter_map(|week| {
            let mut employee_spending = BTreeMap::new();
            for record in lunch_records_in_month(records, month) {
                if !week.contains(record.date) {
                    continue;
                }
                for item in &record.items {
                    let spent = employee_spending
                        .entry(item.employee_id.clone())
                        .or_insert(0_i64);
                    *spent = spent.saturating_add(item.price);
                }
            }

            if employee_spending.is_empty() {
                None
            } else {
                Some(WeeklySpend {
                    week,
                    employee_spending,
                })
            }
        })
        .collect()
}

/// Meal counts, costs and histories of every current employee for `month`.
///
/// Employees are sorted by total meal cost, highest first; ties keep the
/// stored employee order.
#[must_use]
pub fn employee_overview(
    employees: &[Employee],
    records: &[LunchRecord],
    month: YearMonth,
) -> MonthlyOverview {
    let monthly: Vec<&LunchRecord> = lunch_records_in_month(records, month).collect();

    let mut stats: Vec<EmployeeStats> = employees
        .iter()
        .map(|employee| {
            let mut history: Vec<MealEntry> = monthly
                .iter()
                .filter_map(|record| {
                    record.item_for(&employee.id).map(|item| MealEntry {
                        date: record.date,
                        price: item.price,
                        note: item.note.clone(),
                    })
                })
                .collect();
            history.sort_by(|a, b| b.date.cmp(&a.date));

            EmployeeStats {
                employee: employee.clone(),
                meal_count: history.len(),
                total_meal_cost: saturating_total(history.iter().map(|meal| meal.price)),
                history,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_meal_cost.cmp(&a.total_meal_cost));

    let total_spent = saturating_total(stats.iter().map(|entry| entry.total_meal_cost));

    MonthlyOverview {
        month,
        employees: stats,
        total_spent,
    }
}

/// Sum of `amounts`, pinned at the `i64` bounds instead of wrapping.
pub fn saturating_total(amounts: impl IntoIterator<Item = i64>) -> i64 {
    amounts.into_iter().fold(0, i64::saturating_add)
}

/// Sum of every lunch item price in `month`, orphaned items included.
#[must_use]
pub fn monthly_lunch_total(records: &[LunchRecord], month: YearMonth) -> i64 {
    saturating_total(
        lunch_records_in_month(records, month)
            .flat_map(|record| record.items.iter())
            .map(|item| item.price),
    )
}

/// Expenses of `month`, optionally restricted to one owner.
pub fn expenses_in_month<'a>(
    expenses: &'a [ExpenseRecord],
    month: YearMonth,
    user_id: Option<&'a str>,
) -> impl Iterator<Item = &'a ExpenseRecord> {
    expenses.iter().filter(move |expense| {
        month.contains(expense.date) && user_id.is_none_or(|owner| expense.user_id == owner)
    })
}

/// Week-of-month bucket of a day: `ceil(day / 7)`.
#[must_use]
pub fn expense_week_of(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

/// Monthly expense total and `ceil(day / 7)` buckets.
#[must_use]
pub fn expense_summary(
    expenses: &[ExpenseRecord],
    month: YearMonth,
    user_id: Option<&str>,
) -> ExpenseSummary {
    let mut buckets: BTreeMap<u32, ExpenseWeek> = BTreeMap::new();
    let mut total = 0_i64;

    for expense in expenses_in_month(expenses, month, user_id) {
        total = total.saturating_add(expense.amount);
        let week = expense_week_of(expense.date);
        let bucket = buckets.entry(week).or_insert_with(|| ExpenseWeek {
            week,
            total: 0,
            items: Vec::new(),
        });
        bucket.total = bucket.total.saturating_add(expense.amount);
        bucket.items.push(expense.clone());
    }

    ExpenseSummary {
        month,
        total,
        weeks: buckets.into_values().collect(),
    }
}

/// Expense total per day of `month`, for the calendar view.
#[must_use]
pub fn expense_totals_by_date(
    expenses: &[ExpenseRecord],
    month: YearMonth,
    user_id: Option<&str>,
) -> BTreeMap<NaiveDate, i64> {
    let mut totals = BTreeMap::new();
    for expense in expenses_in_month(expenses, month, user_id) {
        let day_total = totals.entry(expense.date).or_insert(0_i64);
        *day_total = day_total.saturating_add(expense.amount);
    }
    totals
}

/// A user's debts of one kind, newest start date first, with totals.
#[must_use]
pub fn debt_summary(debts: &[DebtRecord], user_id: &str, kind: DebtKind) -> DebtSummary {
    let mut records: Vec<DebtRecord> = debts
        .iter()
        .filter(|debt| debt.user_id == user_id && debt.kind == kind)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    DebtSummary {
        kind,
        total_amount: saturating_total(records.iter().map(|debt| debt.amount)),
        total_paid: saturating_total(records.iter().map(|debt| debt.paid_amount)),
        records,
    }
}

/// Borrowed and lent principal of a user's debts started in `month`.
#[must_use]
pub fn monthly_debt_totals(
    debts: &[DebtRecord],
    user_id: &str,
    month: YearMonth,
) -> MonthlyDebtTotals {
    debts
        .iter()
        .filter(|debt| debt.user_id == user_id && month.contains(debt.start_date))
        .fold(MonthlyDebtTotals::default(), |mut totals, debt| {
            match debt.kind {
                DebtKind::Borrow => totals.borrowed = totals.borrowed.saturating_add(debt.amount),
                DebtKind::Lend => totals.lent = totals.lent.saturating_add(debt.amount),
            }
            totals
        })
}

/// Lunch items that reference employees who no longer exist, oldest first.
#[must_use]
pub fn orphaned_items(employees: &[Employee], records: &[LunchRecord]) -> Vec<OrphanedItem> {
    let mut orphans: Vec<OrphanedItem> = records
        .iter()
        .flat_map(|record| {
            record
                .items
                .iter()
                .filter(|item| !employees.iter().any(|e| e.id == item.employee_id))
                .map(|item| OrphanedItem {
                    date: record.date,
                    employee_id: item.employee_id.clone(),
                    price: item.price,
                })
        })
        .collect();
    orphans.sort_by(|a, b| a.date.cmp(&b.date));
    orphans
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::LunchItem;

    fn june() -> YearMonth {
        // June 2024 starts on a Saturday and ends on a Sunday.
        YearMonth::new(2024, 6).unwrap()
    }

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, d).unwrap()
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_uppercase(),
            balance: 0,
        }
    }

    fn record(date: NaiveDate, items: &[(&str, i64)]) -> LunchRecord {
        LunchRecord {
            date,
            items: items
                .iter()
                .map(|(id, price)| LunchItem::new(*id, *price))
                .collect(),
        }
    }

    fn expense(user_id: &str, date: NaiveDate, amount: i64) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("{user_id}-{date}"),
            user_id: user_id.to_string(),
            date,
            title: "Snack".to_string(),
            amount,
            note: None,
        }
    }

    fn debt(
        user_id: &str,
        kind: DebtKind,
        start: NaiveDate,
        amount: i64,
        paid: i64,
    ) -> DebtRecord {
        let mut debt = DebtRecord {
            id: format!("{user_id}-{start}-{amount}"),
            user_id: user_id.to_string(),
            kind,
            person_name: "Hoa".to_string(),
            amount,
            paid_amount: paid,
            start_date: start,
            due_date: None,
            note: String::new(),
            is_finished: false,
        };
        debt.refresh_status();
        debt
    }

    #[test]
    fn test_lunch_weeks_keep_partial_weeks() {
        let weeks = lunch_weeks(june());
        let bounds: Vec<(u32, u32)> = weeks
            .iter()
            .map(|week| (week.start.day(), week.end.day()))
            .collect();
        assert_eq!(bounds, vec![(1, 2), (3, 9), (10, 16), (17, 23), (24, 30)]);
        assert_eq!(weeks[0].label(), "1/6 - 2/6");
        assert_eq!(weeks[4].index, 5);
    }

    #[test]
    fn test_lunch_weeks_month_ending_midweek() {
        // February 2024 starts on a Thursday and ends on Thursday the 29th.
        let weeks = lunch_weeks(YearMonth::new(2024, 2).unwrap());
        assert_eq!(weeks.first().unwrap().end.day(), 4);
        let last = weeks.last().unwrap();
        assert_eq!((last.start.day(), last.end.day()), (26, 29));
        assert_eq!(weeks.len(), 5);
    }

    #[test]
    fn test_weekly_lunch_spend_skips_empty_weeks() {
        let records = vec![
            record(day(6, 3), &[("a", 35_000), ("b", 30_000)]),
            record(day(6, 5), &[("a", 35_000)]),
            record(day(6, 24), &[("ghost", 20_000)]),
            record(day(7, 1), &[("a", 99_000)]),
        ];

        let weeks = weekly_lunch_spend(&records, june());
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week.index, 2);
        assert_eq!(weeks[0].employee_spending["a"], 70_000);
        assert_eq!(weeks[0].employee_spending["b"], 30_000);
        assert_eq!(weeks[0].total(), 100_000);
        assert_eq!(weeks[1].employee_spending["ghost"], 20_000);
    }

    #[test]
    fn test_employee_overview_sorted_by_cost() {
        let employees = vec![employee("a"), employee("b"), employee("c")];
        let records = vec![
            record(day(6, 3), &[("a", 30_000), ("b", 35_000)]),
            record(day(6, 10), &[("b", 35_000)]),
            record(day(5, 31), &[("c", 100_000)]),
        ];

        let overview = employee_overview(&employees, &records, june());
        let order: Vec<&str> = overview
            .employees
            .iter()
            .map(|entry| entry.employee.id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);

        let b = &overview.employees[0];
        assert_eq!(b.meal_count, 2);
        assert_eq!(b.total_meal_cost, 70_000);
        assert_eq!(b.history[0].date, day(6, 10));
        assert_eq!(b.history[1].date, day(6, 3));

        assert_eq!(overview.employees[2].meal_count, 0);
        assert_eq!(overview.total_spent, 100_000);
    }

    #[test]
    fn test_employee_overview_is_pure() {
        let employees = vec![employee("a"), employee("b")];
        let records = vec![
            record(day(6, 12), &[("a", 30_000)]),
            record(day(6, 4), &[("a", 35_000), ("b", 35_000)]),
        ];
        let before = records.clone();

        let first = employee_overview(&employees, &records, june());
        let second = employee_overview(&employees, &records, june());
        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn test_monthly_lunch_total_includes_orphans() {
        let records = vec![
            record(day(6, 3), &[("a", 30_000), ("ghost", 5_000)]),
            record(day(7, 3), &[("a", 30_000)]),
        ];
        assert_eq!(monthly_lunch_total(&records, june()), 35_000);
    }

    #[test]
    fn test_expense_buckets_ceil_day_over_seven() {
        let expenses = vec![
            expense("u1", day(6, 1), 10),
            expense("u1", day(6, 7), 20),
            expense("u1", day(6, 8), 30),
            expense("u1", day(6, 14), 40),
        ];

        let summary = expense_summary(&expenses, june(), None);
        assert_eq!(summary.total, 100);
        assert_eq!(summary.weeks.len(), 2);

        let week1: Vec<u32> = summary.weeks[0].items.iter().map(|e| e.date.day()).collect();
        let week2: Vec<u32> = summary.weeks[1].items.iter().map(|e| e.date.day()).collect();
        assert_eq!((summary.weeks[0].week, week1), (1, vec![1, 7]));
        assert_eq!((summary.weeks[1].week, week2), (2, vec![8, 14]));
        assert_eq!(summary.weeks[0].total, 30);
        assert_eq!(summary.weeks[1].total, 70);
    }

    #[test]
    fn test_expense_week_of_month_end() {
        assert_eq!(expense_week_of(day(6, 29)), 5);
        assert_eq!(expense_week_of(day(6, 28)), 4);
    }

    #[test]
    fn test_expense_summary_filters_month_and_owner() {
        let expenses = vec![
            expense("u1", day(6, 2), 10),
            expense("u2", day(6, 2), 20),
            expense("u1", day(7, 2), 40),
        ];

        assert_eq!(expense_summary(&expenses, june(), Some("u1")).total, 10);
        assert_eq!(expense_summary(&expenses, june(), None).total, 30);

        let by_date = expense_totals_by_date(&expenses, june(), None);
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[&day(6, 2)], 30);
    }

    #[test]
    fn test_debt_summary_sorted_with_totals() {
        let debts = vec![
            debt("u1", DebtKind::Borrow, day(1, 5), 1_000, 200),
            debt("u1", DebtKind::Borrow, day(3, 1), 500, 500),
            debt("u1", DebtKind::Lend, day(2, 1), 700, 0),
            debt("u2", DebtKind::Borrow, day(4, 1), 900, 0),
        ];

        let summary = debt_summary(&debts, "u1", DebtKind::Borrow);
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.records[0].start_date, day(3, 1));
        assert_eq!(summary.total_amount, 1_500);
        assert_eq!(summary.total_paid, 700);
        assert_eq!(summary.remaining(), 800);
    }

    #[test]
    fn test_monthly_debt_totals() {
        let debts = vec![
            debt("u1", DebtKind::Borrow, day(6, 5), 1_000, 0),
            debt("u1", DebtKind::Lend, day(6, 20), 300, 0),
            debt("u1", DebtKind::Lend, day(5, 20), 50, 0),
            debt("u2", DebtKind::Lend, day(6, 20), 70, 0),
        ];

        let totals = monthly_debt_totals(&debts, "u1", june());
        assert_eq!(
            totals,
            MonthlyDebtTotals {
                borrowed: 1_000,
                lent: 300
            }
        );
    }

    #[test]
    fn test_orphaned_items() {
        let employees = vec![employee("a")];
        let records = vec![
            record(day(6, 9), &[("a", 1), ("gone", 2)]),
            record(day(6, 2), &[("gone", 3)]),
        ];

        let orphans = orphaned_items(&employees, &records);
        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].date, day(6, 2));
        assert_eq!(orphans[1].price, 2);
    }

    #[test]
    fn test_totals_saturate_instead_of_wrapping() {
        assert_eq!(saturating_total([i64::MAX, 1, 5]), i64::MAX);
        assert_eq!(saturating_total([i64::MIN, -1]), i64::MIN);
        assert_eq!(saturating_total(Vec::<i64>::new()), 0);

        let records = vec![
            record(day(6, 3), &[("a", i64::MAX)]),
            record(day(6, 4), &[("a", 10)]),
        ];
        assert_eq!(monthly_lunch_total(&records, june()), i64::MAX);
    }
}
