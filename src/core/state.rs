//! In-memory application state - the single owner of every collection.

use crate::models::{
    AppSettings, DebtRecord, Employee, ExpenseRecord, LunchRecord, SystemLog, User,
};
use serde::{Deserialize, Serialize};

/// All collections the ledger works on.
///
/// Balances and lunch records are only ever changed together inside one
/// synchronous call, which keeps them consistent without locks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Employees and their running balances
    pub employees: Vec<Employee>,
    /// One record per day that had lunches
    pub lunch_records: Vec<LunchRecord>,
    /// Fund expenses of every user
    pub expense_records: Vec<ExpenseRecord>,
    /// Debt book entries of every user
    pub debt_records: Vec<DebtRecord>,
    /// Process-wide settings
    pub settings: AppSettings,
    /// Activity log, append-only
    pub logs: Vec<SystemLog>,
    /// Accounts
    pub users: Vec<User>,
}

impl AppState {
    /// Fresh state: no records, the given settings and a single seeded admin.
    #[must_use]
    pub fn with_defaults(settings: AppSettings, admin: User) -> Self {
        Self {
            settings,
            users: vec![admin],
            ..Self::default()
        }
    }

    /// Looks up an employee by id.
    #[must_use]
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    /// Looks up an employee by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn employee_by_name(&self, name: &str) -> Option<&Employee> {
        let wanted = name.trim().to_lowercase();
        self.employees
            .iter()
            .find(|employee| employee.name.trim().to_lowercase() == wanted)
    }

    /// The lunch record for `date`, if one is stored.
    #[must_use]
    pub fn lunch_record(&self, date: chrono::NaiveDate) -> Option<&LunchRecord> {
        self.lunch_records.iter().find(|record| record.date == date)
    }
}
