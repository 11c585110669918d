//! Lunch records - who ate on which day, and at what price.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One employee's meal on a given day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunchItem {
    /// Employee charged for this meal (may reference a deleted employee)
    pub employee_id: String,
    /// Charge for the meal, never negative
    pub price: i64,
    /// Optional free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LunchItem {
    /// Creates an item without a note.
    #[must_use]
    pub fn new(employee_id: impl Into<String>, price: i64) -> Self {
        Self {
            employee_id: employee_id.into(),
            price,
            note: None,
        }
    }
}

/// All meals recorded for one calendar day.
///
/// A day with no items is never stored; the record is removed instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunchRecord {
    /// Calendar day, unique across records
    pub date: NaiveDate,
    /// At most one item per employee
    pub items: Vec<LunchItem>,
}

impl LunchRecord {
    /// Returns the item charged to `employee_id`, if any.
    #[must_use]
    pub fn item_for(&self, employee_id: &str) -> Option<&LunchItem> {
        self.items.iter().find(|item| item.employee_id == employee_id)
    }
}
