//! Fund expense record - a per-user discretionary spending entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A spending entry in a user's fund. Immutable once created; only deletion is allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Day the money was spent
    pub date: NaiveDate,
    /// Short title
    pub title: String,
    /// Amount spent, never negative
    pub amount: i64,
    /// Optional note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
