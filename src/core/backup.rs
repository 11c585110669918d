//! Backup snapshots, restore and reset.
//!
//! A snapshot holds every collection plus a version tag and a timestamp. On
//! import, each collection present in the file replaces the in-memory one
//! wholesale; absent keys leave the current collection alone.

use crate::{
    core::{
        auth::{self, SEEDED_ADMIN_ID},
        state::AppState,
    },
    errors::{Error, Result},
    models::{
        AppSettings, DebtRecord, Employee, ExpenseRecord, LunchRecord, SystemLog, User,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version tag written into every export.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Self-describing backup of the whole application state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Format version
    #[serde(default)]
    pub version: Option<String>,
    /// When the snapshot was taken
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Employees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<Employee>>,
    /// Lunch records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch_records: Option<Vec<LunchRecord>>,
    /// Fund expenses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_records: Option<Vec<ExpenseRecord>>,
    /// Debt book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_records: Option<Vec<DebtRecord>>,
    /// Settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
    /// Activity log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<SystemLog>>,
    /// Accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

/// Answer to the overwrite prompt that every import must go through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Replace current data with the snapshot
    Confirmed,
    /// Keep current data
    Declined,
}

/// Which collections an import replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Collection keys that were replaced, in snapshot order
    pub replaced: Vec<&'static str>,
}

/// Captures every collection of `state`.
#[must_use]
pub fn export_snapshot(state: &AppState, now: DateTime<Utc>) -> Snapshot {
    Snapshot {
        version: Some(SNAPSHOT_VERSION.to_string()),
        timestamp: Some(now),
        employees: Some(state.employees.clone()),
        lunch_records: Some(state.lunch_records.clone()),
        expense_records: Some(state.expense_records.clone()),
        debt_records: Some(state.debt_records.clone()),
        settings: Some(state.settings.clone()),
        logs: Some(state.logs.clone()),
        users: Some(state.users.clone()),
    }
}

/// Pretty-printed JSON of a snapshot.
///
/// # Errors
/// Returns [`Error::Serialization`] if encoding fails.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Backup file name for an export taken on `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("LunchBuddy_Backup_{}.json", date.format("%Y-%m-%d"))
}

/// Brings records from older backups up to the current shape.
///
/// Accounts that still carry a plaintext `password` get it argon2-hashed into
/// `passwordHash`, and the plaintext is dropped either way. Expenses written
/// before funds had owners are assigned to the seeded admin.
fn upgrade_legacy_records(object: &mut Map<String, Value>) -> Result<()> {
    let now = Utc::now();
    let mut upgraded_users = 0_usize;
    if let Some(Value::Array(users)) = object.get_mut("users") {
        for user in users.iter_mut().filter_map(Value::as_object_mut) {
            user.entry("createdAt")
                .or_insert_with(|| Value::String(now.to_rfc3339()));
            let Some(password) = user.remove("password") else {
                continue;
            };
            if user.contains_key("passwordHash") {
                continue;
            }
            let Some(password) = password.as_str() else {
                return Err(Error::InvalidBackup {
                    message: "user password must be a string".to_string(),
                });
            };
            user.insert(
                "passwordHash".to_string(),
                Value::String(auth::hash_password(password)?),
            );
            upgraded_users += 1;
        }
    }

    let mut assigned_expenses = 0_usize;
    if let Some(Value::Array(expenses)) = object.get_mut("expenseRecords") {
        for expense in expenses.iter_mut().filter_map(Value::as_object_mut) {
            if !expense.contains_key("userId") {
                expense.insert(
                    "userId".to_string(),
                    Value::String(SEEDED_ADMIN_ID.to_string()),
                );
                assigned_expenses += 1;
            }
        }
    }

    if upgraded_users > 0 || assigned_expenses > 0 {
        tracing::info!(
            upgraded_users,
            assigned_expenses,
            "Upgraded records from an older backup format"
        );
    }
    Ok(())
}

/// Parses an uploaded backup.
///
/// Older backups are accepted: plaintext account passwords are hashed and
/// ownerless expenses go to the seeded admin.
///
/// # Errors
/// Returns [`Error::InvalidBackup`] for text that is not a JSON object,
/// lacks both `employees` and `lunchRecords`, or whose collections do not
/// have the expected shape, and [`Error::PasswordHash`] if a legacy
/// password cannot be hashed.
pub fn parse_snapshot(contents: &str) -> Result<Snapshot> {
    let mut value: Value = serde_json::from_str(contents).map_err(|e| Error::InvalidBackup {
        message: format!("not valid JSON: {e}"),
    })?;

    let Some(object) = value.as_object_mut() else {
        return Err(Error::InvalidBackup {
            message: "expected a JSON object".to_string(),
        });
    };
    let present = |key: &str| object.get(key).is_some_and(|v| !v.is_null());
    if !present("employees") && !present("lunchRecords") {
        return Err(Error::InvalidBackup {
            message: "neither employees nor lunchRecords is present".to_string(),
        });
    }
    upgrade_legacy_records(object)?;

    let snapshot: Snapshot = serde_json::from_value(value).map_err(|e| Error::InvalidBackup {
        message: e.to_string(),
    })?;

    if let Some(version) = snapshot.version.as_deref() {
        if version != SNAPSHOT_VERSION {
            tracing::warn!(version, "Importing a backup with an unknown version tag");
        }
    }

    Ok(snapshot)
}

/// Replaces every collection present in `snapshot`, once confirmed.
///
/// Returns `None` and leaves `state` untouched when the overwrite was declined.
pub fn apply_snapshot(
    state: &mut AppState,
    snapshot: Snapshot,
    confirmation: Confirmation,
) -> Option<ImportOutcome> {
    if confirmation == Confirmation::Declined {
        return None;
    }

    let mut replaced = Vec::new();
    if let Some(employees) = snapshot.employees {
        state.employees = employees;
        replaced.push("employees");
    }
    if let Some(lunch_records) = snapshot.lunch_records {
        state.lunch_records = lunch_records;
        replaced.push("lunchRecords");
    }
    if let Some(expense_records) = snapshot.expense_records {
        state.expense_records = expense_records;
        replaced.push("expenseRecords");
    }
    if let Some(debt_records) = snapshot.debt_records {
        state.debt_records = debt_records;
        replaced.push("debtRecords");
    }
    if let Some(settings) = snapshot.settings {
        state.settings = settings;
        replaced.push("settings");
    }
    if let Some(logs) = snapshot.logs {
        state.logs = logs;
        replaced.push("logs");
    }
    if let Some(users) = snapshot.users {
        state.users = users;
        replaced.push("users");
    }

    Some(ImportOutcome { replaced })
}

/// Wipes every collection back to its default in one step.
///
/// Settings revert to `settings`, and the account list to the single `admin`.
pub fn reset(state: &mut AppState, settings: AppSettings, admin: User) {
    *state = AppState::with_defaults(settings, admin);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::{LunchItem, Role};

    fn sample_state() -> AppState {
        AppState {
            employees: vec![Employee::new("An"), Employee::new("Binh"), Employee::new("Chi")],
            lunch_records: vec![LunchRecord {
                date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                items: vec![LunchItem::new("x", 35_000)],
            }],
            ..AppState::default()
        }
    }

    fn admin() -> User {
        User {
            id: "admin".to_string(),
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_contains_every_collection() {
        let state = sample_state();
        let snapshot = export_snapshot(&state, Utc::now());
        let json: serde_json::Value =
            serde_json::from_str(&snapshot_to_json(&snapshot).unwrap()).unwrap();

        assert_eq!(json["version"], "1.0");
        for key in [
            "timestamp",
            "employees",
            "lunchRecords",
            "expenseRecords",
            "debtRecords",
            "settings",
            "logs",
            "users",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["employees"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_import_replaces_instead_of_merging() {
        let mut state = sample_state();
        let backup = r#"{
            "version": "1.0",
            "timestamp": "2024-06-30T10:00:00Z",
            "employees": [{"id": "e9", "name": "Dung", "balance": 70000}]
        }"#;

        let snapshot = parse_snapshot(backup).unwrap();
        let outcome = apply_snapshot(&mut state, snapshot, Confirmation::Confirmed).unwrap();

        assert_eq!(outcome.replaced, vec!["employees"]);
        assert_eq!(state.employees.len(), 1);
        assert_eq!(state.employees[0].name, "Dung");
        // Absent keys are not restored.
        assert_eq!(state.lunch_records.len(), 1);
    }

    #[test]
    fn test_declined_import_changes_nothing() {
        let mut state = sample_state();
        let before = state.clone();
        let snapshot = parse_snapshot(r#"{"lunchRecords": []}"#).unwrap();

        assert!(apply_snapshot(&mut state, snapshot, Confirmation::Declined).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_parse_rejects_missing_core_collections() {
        let result = parse_snapshot(r#"{"version": "1.0", "settings": {"costPerMeal": 1}}"#);
        assert!(matches!(result, Err(Error::InvalidBackup { .. })));

        assert!(matches!(parse_snapshot("not json"), Err(Error::InvalidBackup { .. })));
        assert!(matches!(parse_snapshot("[1, 2]"), Err(Error::InvalidBackup { .. })));
        assert!(matches!(
            parse_snapshot(r#"{"employees": "oops"}"#),
            Err(Error::InvalidBackup { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_legacy_settings_key() {
        let snapshot = parse_snapshot(
            r#"{"employees": [], "settings": {"costPerMeal": 30000, "expenseThemeColor": "teal"}}"#,
        )
        .unwrap();
        let settings = snapshot.settings.unwrap();
        assert_eq!(settings.cost_per_meal, 30_000);
        assert_eq!(settings.theme_color, "teal");
    }

    #[test]
    fn test_parse_upgrades_older_backup_format() {
        let backup = r#"{
            "employees": [{"id": "e1", "name": "An", "balance": -35000}],
            "lunchRecords": [{"date": "2024-06-03", "items": [{"employeeId": "e1", "price": 35000}]}],
            "expenseRecords": [{"id": "x1", "date": "2024-06-04", "title": "Water", "amount": 20000}],
            "users": [{
                "id": "admin",
                "username": "admin",
                "password": "admin",
                "role": "admin",
                "createdAt": "2024-01-01T00:00:00.000Z"
            }]
        }"#;

        let snapshot = parse_snapshot(backup).unwrap();

        let users = snapshot.users.unwrap();
        assert_eq!(users.len(), 1);
        assert_ne!(users[0].password_hash, "admin");
        assert!(auth::verify_password("admin", &users[0].password_hash));

        let expenses = snapshot.expense_records.unwrap();
        assert_eq!(expenses[0].user_id, SEEDED_ADMIN_ID);
        assert_eq!(snapshot.employees.unwrap()[0].balance, -35_000);
    }

    #[test]
    fn test_parse_drops_plaintext_next_to_hash() {
        let hash = auth::hash_password("pw").unwrap();
        let backup = format!(
            r#"{{"employees": [], "users": [{{
                "id": "u1", "username": "lan", "password": "other",
                "passwordHash": "{hash}", "role": "user", "createdAt": "2024-01-01T00:00:00Z"
            }}]}}"#
        );

        let users = parse_snapshot(&backup).unwrap().users.unwrap();
        assert_eq!(users[0].password_hash, hash);
        let json = snapshot_to_json(&Snapshot {
            users: Some(users),
            ..Snapshot::default()
        })
        .unwrap();
        assert!(!json.contains("\"password\""));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = sample_state();
        reset(&mut state, AppSettings::default(), admin());

        assert!(state.employees.is_empty());
        assert!(state.lunch_records.is_empty());
        assert!(state.logs.is_empty());
        assert_eq!(state.settings, AppSettings::default());
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.users[0].id, "admin");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(export_file_name(date), "LunchBuddy_Backup_2024-07-09.json");
    }
}
