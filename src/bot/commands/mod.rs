//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Login, registration and session commands
pub mod auth;

/// Data commands: backups, reset, activity log and settings
pub mod data;

/// Debt book commands
pub mod debt;

/// Employee and balance commands
pub mod employee;

/// Personal fund commands
pub mod fund;

/// General utility commands
pub mod general;

/// Lunch recording commands
pub mod lunch;

/// Payment scanner command
pub mod scan;

/// Monthly statistics command
pub mod stats;

// Export commands
pub use auth::*;
pub use data::*;
pub use debt::*;
pub use employee::*;
pub use fund::*;
pub use general::*;
pub use lunch::*;
pub use scan::*;
pub use stats::*;
