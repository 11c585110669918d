//! Shared test utilities for `LunchBuddy`.
//!
//! This module provides common helpers for setting up in-memory stores, a
//! loaded ledger, sessions for each role, and a matcher that never touches
//! the network.

use crate::{
    config::AppConfig,
    core::{
        auth::{AuthSession, SessionState},
        expense::NewExpense,
        ledger::Ledger,
        matcher::{Candidate, PaymentMatch, PaymentMatcher},
    },
    db::{KvStore, Persistence},
    errors::{Error, Result},
    models::{Employee, Role, SessionUser},
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

/// Admin secret used by every test ledger.
pub const TEST_ADMIN_PASSWORD: &str = "test-admin";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a local-only ledger with default configuration and the seeded admin.
pub async fn setup_test_ledger() -> Result<Ledger> {
    let persistence = Persistence::local_only(KvStore::new(setup_test_db().await?, "local"));
    Ledger::load(persistence, AppConfig::default(), TEST_ADMIN_PASSWORD).await
}

fn session_for(id: &str, role: Role) -> SessionState {
    SessionState::Authenticated(AuthSession {
        user: SessionUser {
            id: id.to_string(),
            username: id.to_string(),
            role,
        },
        expires_at: Utc::now() + Duration::days(7),
    })
}

/// A valid session for the seeded admin of `ledger`.
pub fn admin_session(ledger: &Ledger) -> SessionState {
    ledger
        .state()
        .users
        .iter()
        .find(|user| user.role == Role::Admin)
        .map_or_else(
            || session_for("admin", Role::Admin),
            |admin| {
                SessionState::Authenticated(AuthSession::start(admin, Utc::now(), 7))
            },
        )
}

/// A valid `user`-role session with the given id.
pub fn user_session(id: &str) -> SessionState {
    session_for(id, Role::User)
}

/// Adds two employees, "Lan" and "Minh", through the ledger.
pub async fn add_two_employees(
    ledger: &mut Ledger,
    admin: &SessionState,
) -> Result<(Employee, Employee)> {
    let denied = || Error::Validation {
        message: "test session is not an admin".to_string(),
    };
    let lan = ledger.add_employee(admin, "Lan").await?.ok_or_else(denied)?;
    let minh = ledger.add_employee(admin, "Minh").await?.ok_or_else(denied)?;
    Ok((lan, minh))
}

/// An expense input dated 2024-06-10.
pub fn sample_expense(title: &str, amount: i64) -> NewExpense {
    NewExpense {
        date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap_or_default(),
        title: title.to_string(),
        amount,
        note: None,
    }
}

/// Matcher returning a canned answer, or failing like an unreachable service.
pub struct FakeMatcher {
    answer: Option<PaymentMatch>,
}

impl FakeMatcher {
    /// Always matches `employee_id` with `amount`.
    pub fn matching(employee_id: &str, amount: f64) -> Self {
        Self {
            answer: Some(PaymentMatch {
                matched_employee_id: Some(employee_id.to_string()),
                amount,
                confidence: "test".to_string(),
            }),
        }
    }

    /// Always fails.
    pub const fn failing() -> Self {
        Self { answer: None }
    }
}

impl PaymentMatcher for FakeMatcher {
    async fn match_payment(&self, _text: &str, _candidates: &[Candidate]) -> Result<PaymentMatch> {
        self.answer.clone().ok_or_else(|| Error::Matcher {
            message: "matcher unavailable".to_string(),
        })
    }
}
