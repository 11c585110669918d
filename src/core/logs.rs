//! Activity log - one entry per committed mutation.

use crate::models::{SystemLog, new_id};
use chrono::{DateTime, Utc};

/// Appends an entry stamped `now` and returns a copy of it.
pub fn append(
    logs: &mut Vec<SystemLog>,
    action: &str,
    details: impl Into<String>,
    now: DateTime<Utc>,
) -> SystemLog {
    let entry = SystemLog {
        id: new_id(),
        timestamp: now,
        action: action.to_string(),
        details: details.into(),
    };
    logs.push(entry.clone());
    entry
}

/// The `limit` most recent entries, newest first.
#[must_use]
pub fn newest_first(logs: &[SystemLog], limit: usize) -> Vec<&SystemLog> {
    let mut sorted: Vec<&SystemLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}
