//! Domain records - plain serde types for everything the ledger stores.
//!
//! These are not database entities: each collection is serialized as one JSON
//! value into the `app_data` key-value table. Field names are camelCase so a
//! stored collection and a backup snapshot share the same wire format.

pub mod debt;
pub mod employee;
pub mod expense;
pub mod log;
pub mod lunch;
pub mod settings;
pub mod user;

pub use debt::{DebtKind, DebtRecord};
pub use employee::Employee;
pub use expense::ExpenseRecord;
pub use log::SystemLog;
pub use lunch::{LunchItem, LunchRecord};
pub use settings::AppSettings;
pub use user::{Role, SessionUser, User};

/// Generates a fresh record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
