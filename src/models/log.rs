//! Activity log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only activity log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    /// Unique identifier
    pub id: String,
    /// When the action was committed
    pub timestamp: DateTime<Utc>,
    /// Short action label, e.g. `"lunch.update"`
    pub action: String,
    /// Free-text details
    pub details: String,
}
