use thiserror::Error;

/// Every failure the bookkeeping core, the persistence layer and the bot can report.
///
/// Authorization denials are deliberately absent: gated operations return
/// `Ok(None)` instead of an error when the caller lacks the required role.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored value or backup could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Amount is negative where only non-negative amounts are allowed, or
    /// would push a balance or total past the `i64` range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Input failed a structural or business rule check
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// No employee with this id exists
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id that was looked up
        id: String,
    },

    /// No expense/debt/log record with this id exists
    #[error("Record not found: {id}")]
    RecordNotFound {
        /// The record id that was looked up
        id: String,
    },

    /// Username or password did not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration attempted with a username that already exists
    #[error("Username already taken: {username}")]
    UsernameTaken {
        /// The requested username
        username: String,
    },

    /// Argon2 hashing or hash parsing failed
    #[error("Password hashing failed: {message}")]
    PasswordHash {
        /// Error reported by the hasher
        message: String,
    },

    /// Uploaded backup file is malformed
    #[error("Invalid backup file: {message}")]
    InvalidBackup {
        /// Why the snapshot was rejected
        message: String,
    },

    /// The external payment matcher failed or returned garbage
    #[error("Payment matcher error: {message}")]
    Matcher {
        /// Why the match could not be produced
        message: String,
    },

    /// HTTP transport failure talking to an external service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a `String` buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Discord framework failure
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
