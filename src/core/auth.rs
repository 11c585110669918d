//! Access control - accounts, time-boxed sessions and the mutation gate.
//!
//! Shared resources (employees, lunches, settings, import/reset) need the
//! admin role. A user's own expenses and debts need any authenticated user
//! whose id matches the owner. A denied check yields `None` rather than an
//! error, so gated operations silently do nothing.

use crate::{
    errors::{Error, Result},
    models::{Role, SessionUser, User, new_id},
};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stable id of the seeded admin account.
pub const SEEDED_ADMIN_ID: &str = "admin";

/// A persisted login: user snapshot plus an absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Who is logged in
    pub user: SessionUser,
    /// The session is invalid once `now > expires_at`
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Starts a session for `user` lasting `days` from `now`. Never refreshed.
    ///
    /// A window past the calendar range ends at the latest representable time.
    #[must_use]
    pub fn start(user: &User, now: DateTime<Utc>, days: i64) -> Self {
        let expires_at = Duration::try_days(days)
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            user: user.snapshot(),
            expires_at,
        }
    }

    /// Whether the session has run out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Authentication state of one caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Not logged in
    #[default]
    Anonymous,
    /// Logged in until the session expires
    Authenticated(AuthSession),
}

impl SessionState {
    /// Restores a persisted session, discarding it once expired.
    #[must_use]
    pub fn restore(stored: Option<AuthSession>, now: DateTime<Utc>) -> Self {
        match stored {
            Some(session) if !session.is_expired(now) => Self::Authenticated(session),
            _ => Self::Anonymous,
        }
    }

    /// The logged-in user if the session is still valid at `now`.
    #[must_use]
    pub fn user(&self, now: DateTime<Utc>) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(session) if !session.is_expired(now) => Some(&session.user),
            _ => None,
        }
    }
}

/// What a mutation touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Employees, lunch records, settings, import and reset
    Shared,
    /// A record owned by `owner_id` (expenses and debts)
    Owned {
        /// Owner of the record being changed
        owner_id: &'a str,
    },
    /// Creating a new record owned by the acting user
    OwnNew,
}

/// Checks whether `session` may perform a mutation on `scope` at `now`.
///
/// Returns the acting user when allowed and `None` otherwise.
#[must_use]
pub fn authorize<'s>(
    session: &'s SessionState,
    scope: Scope<'_>,
    now: DateTime<Utc>,
) -> Option<&'s SessionUser> {
    let user = session.user(now)?;
    let allowed = match scope {
        Scope::Shared => user.is_admin(),
        Scope::Owned { owner_id } => user.id == owner_id,
        Scope::OwnNew => true,
    };
    allowed.then_some(user)
}

/// Hashes a secret with argon2 and a random salt.
///
/// # Errors
/// Returns [`Error::PasswordHash`] if the hasher fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks a secret against a stored argon2 hash. A malformed hash never matches.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The seeded admin account with the stable id `admin`.
///
/// # Errors
/// Returns [`Error::PasswordHash`] if the secret cannot be hashed.
pub fn seed_admin(username: &str, password: &str, now: DateTime<Utc>) -> Result<User> {
    Ok(User {
        id: SEEDED_ADMIN_ID.to_string(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
        created_at: now,
    })
}

/// Finds the account with exactly `username` (surrounding whitespace ignored,
/// as on registration) and checks the secret.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] when either does not match.
pub fn login<'a>(users: &'a [User], username: &str, password: &str) -> Result<&'a User> {
    let username = username.trim();
    users
        .iter()
        .find(|user| user.username == username)
        .filter(|user| verify_password(password, &user.password_hash))
        .ok_or(Error::InvalidCredentials)
}

/// Creates a `user`-role account when the username is free.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty username or password and
/// [`Error::UsernameTaken`] when the name already exists.
pub fn register(
    users: &mut Vec<User>,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<User> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::Validation {
            message: "Username and password are required".to_string(),
        });
    }
    if users.iter().any(|user| user.username == username) {
        return Err(Error::UsernameTaken {
            username: username.to_string(),
        });
    }

    let user = User {
        id: new_id(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role: Role::User,
        created_at: now,
    };
    users.push(user.clone());
    Ok(user)
}
