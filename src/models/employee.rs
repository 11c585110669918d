//! Employee record - a person who joins shared lunches and carries a running balance.

use serde::{Deserialize, Serialize};

/// An employee and their running balance in whole currency units.
///
/// Positive balance means the employee has credit, negative means they owe money.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Stable unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Sum of all credits minus all charges ever applied to this employee
    pub balance: i64,
}

impl Employee {
    /// Creates an employee with a zero balance.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            name: name.into(),
            balance: 0,
        }
    }
}
