//! Accounts and the user snapshot carried by a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May mutate shared resources (employees, lunches, settings, import/reset)
    Admin,
    /// May only mutate their own expenses and debts
    User,
}

impl Role {
    /// Lowercase label used in replies and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// A stored account. The secret is kept as an argon2 PHC hash, never verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Role granted to this account
    pub role: Role,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Snapshot of this account without the secret.
    #[must_use]
    pub fn snapshot(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The part of a [`User`] embedded in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Account id
    pub id: String,
    /// Login name
    pub username: String,
    /// Role at login time
    pub role: Role,
}

impl SessionUser {
    /// Whether this snapshot carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
