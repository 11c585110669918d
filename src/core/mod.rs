//! Core business logic, independent of Discord.
//!
//! Pure state operations live in their own modules and work on
//! [`state::AppState`]; [`ledger::Ledger`] wraps them with the access gate,
//! the activity log and persistence.

/// Argon2 accounts, sessions and the mutation gate
pub mod auth;
/// Snapshot export, import and reset
pub mod backup;
/// Lunch reconciliation and balance credits
pub mod balance;
/// Canonical days and months
pub mod calendar;
/// Debt book entries
pub mod debt;
/// Employee management
pub mod employee;
/// Fund expenses
pub mod expense;
/// The stateful service every front-end talks to
pub mod ledger;
/// Activity log
pub mod logs;
/// External payment matcher
pub mod matcher;
/// Plain-text formatting of reports
pub mod report;
/// In-memory application state
pub mod state;
/// Monthly statistics
pub mod stats;
/// Theme color lookup
pub mod theme;
