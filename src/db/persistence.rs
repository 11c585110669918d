//! Local store plus optional remote mirror.
//!
//! Writes go to the local store first and then to the remote mirror, as two
//! independent best-effort steps: a failure on either side is logged and
//! swallowed so the ledger keeps working in local-only mode. On load, any value
//! the remote has for a collection wins over the local one (last write wins,
//! no timestamp comparison) and is copied back into the local store.

use super::store::KvStore;
use crate::errors::Result;
use serde::{Serialize, de::DeserializeOwned};

/// Logical collections, each persisted under its own key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `employees`
    Employees,
    /// `lunchRecords`
    LunchRecords,
    /// `expenseRecords`
    ExpenseRecords,
    /// `debtRecords`
    DebtRecords,
    /// `settings`
    Settings,
    /// `logs`
    Logs,
    /// `users`
    Users,
}

impl Collection {
    /// Every collection, in snapshot order.
    pub const ALL: [Self; 7] = [
        Self::Employees,
        Self::LunchRecords,
        Self::ExpenseRecords,
        Self::DebtRecords,
        Self::Settings,
        Self::Logs,
        Self::Users,
    ];

    /// Storage key, identical locally, remotely and in backup files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::LunchRecords => "lunchRecords",
            Self::ExpenseRecords => "expenseRecords",
            Self::DebtRecords => "debtRecords",
            Self::Settings => "settings",
            Self::Logs => "logs",
            Self::Users => "users",
        }
    }
}

/// Storage used by the ledger: a local store and, when configured, a remote mirror.
#[derive(Clone, Debug)]
pub struct Persistence {
    local: KvStore,
    remote: Option<KvStore>,
}

impl Persistence {
    /// Local-only persistence.
    #[must_use]
    pub const fn local_only(local: KvStore) -> Self {
        Self {
            local,
            remote: None,
        }
    }

    /// Local persistence mirrored to `remote`.
    #[must_use]
    pub const fn with_remote(local: KvStore, remote: KvStore) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }

    /// Whether a remote mirror is configured.
    #[must_use]
    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// The local store.
    #[must_use]
    pub const fn local(&self) -> &KvStore {
        &self.local
    }

    /// The remote mirror, if configured.
    #[must_use]
    pub const fn remote(&self) -> Option<&KvStore> {
        self.remote.as_ref()
    }

    /// Persists a collection locally and then to the remote mirror.
    ///
    /// Never fails: serialization or store errors are logged and dropped.
    pub async fn save<T: Serialize + Sync>(&self, collection: Collection, value: &T) {
        let content = match serde_json::to_value(value) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(key = collection.key(), "Failed to serialize collection: {e}");
                return;
            }
        };

        if let Err(e) = self.local.set(collection.key(), content.clone()).await {
            tracing::warn!(key = collection.key(), "Local save failed: {e}");
        }

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.set(collection.key(), content).await {
                tracing::warn!(key = collection.key(), "Remote save failed: {e}");
            }
        }
    }

    /// Loads a collection, preferring the remote value when one exists.
    ///
    /// Returns `Ok(None)` when neither store has the key. A local value that no
    /// longer deserializes is an error; an unreachable or malformed remote only
    /// logs a warning and leaves the local value in charge.
    pub async fn load<T: DeserializeOwned + Send>(
        &self,
        collection: Collection,
    ) -> Result<Option<T>> {
        let key = collection.key();
        let local = match self.local.get(key).await? {
            Some(content) => Some(serde_json::from_value::<T>(content)?),
            None => None,
        };

        let Some(remote) = &self.remote else {
            return Ok(local);
        };

        match remote.get(key).await {
            Ok(Some(content)) => match serde_json::from_value::<T>(content.clone()) {
                Ok(value) => {
                    tracing::info!(key, "Remote value overrides local state");
                    if let Err(e) = self.local.set(key, content).await {
                        tracing::warn!(key, "Failed to copy remote value to local store: {e}");
                    }
                    Ok(Some(value))
                }
                Err(e) => {
                    tracing::warn!(key, "Ignoring malformed remote value: {e}");
                    Ok(local)
                }
            },
            Ok(None) => Ok(local),
            Err(e) => {
                tracing::warn!(key, "Remote load failed, continuing with local data: {e}");
                Ok(local)
            }
        }
    }

    /// Reads a caller's session from the local store only.
    pub async fn load_session<T: DeserializeOwned>(&self, session_key: &str) -> Result<Option<T>> {
        self.local
            .get(session_key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Writes a caller's session to the local store only.
    pub async fn save_session<T: Serialize>(&self, session_key: &str, session: &T) -> Result<()> {
        self.local
            .set(session_key, serde_json::to_value(session)?)
            .await
    }

    /// Forgets a caller's session.
    pub async fn clear_session(&self, session_key: &str) -> Result<()> {
        self.local.remove(session_key).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::Employee;
    use crate::test_utils::setup_test_db;
    use serde_json::json;

    async fn mirrored() -> Result<Persistence> {
        Ok(Persistence::with_remote(
            KvStore::new(setup_test_db().await?, "local"),
            KvStore::new(setup_test_db().await?, "remote"),
        ))
    }

    #[tokio::test]
    async fn test_save_writes_both_stores() -> Result<()> {
        let persistence = mirrored().await?;
        let employees = vec![Employee::new("An")];

        persistence.save(Collection::Employees, &employees).await;

        let local = persistence.local().get("employees").await?;
        let remote = persistence.remote.as_ref().unwrap().get("employees").await?;
        assert!(local.is_some());
        assert_eq!(remote, local);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_collection() -> Result<()> {
        let persistence = Persistence::local_only(KvStore::new(setup_test_db().await?, "local"));
        let loaded: Option<Vec<Employee>> = persistence.load(Collection::Employees).await?;
        assert!(loaded.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_value_wins_on_load() -> Result<()> {
        let persistence = mirrored().await?;
        persistence
            .local()
            .set("settings", json!({"costPerMeal": 30000, "themeColor": "blue"}))
            .await?;
        persistence
            .remote
            .as_ref()
            .unwrap()
            .set("settings", json!({"costPerMeal": 45000, "themeColor": "pink"}))
            .await?;

        let loaded: Option<crate::models::AppSettings> =
            persistence.load(Collection::Settings).await?;
        let loaded = loaded.map(|settings| settings.cost_per_meal);
        assert_eq!(loaded, Some(45_000));

        // Remote value is copied back into the local store.
        let local = persistence.local().get("settings").await?;
        assert_eq!(local, Some(json!({"costPerMeal": 45000, "themeColor": "pink"})));
        Ok(())
    }

    #[tokio::test]
    async fn test_local_value_kept_when_remote_missing_key() -> Result<()> {
        let persistence = mirrored().await?;
        persistence
            .local()
            .set("employees", json!([{"id": "e1", "name": "Binh", "balance": -35000}]))
            .await?;

        let loaded: Option<Vec<Employee>> = persistence.load(Collection::Employees).await?;
        let balances: Vec<i64> = loaded.unwrap_or_default().iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![-35_000]);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_remote_value_is_ignored() -> Result<()> {
        let persistence = mirrored().await?;
        persistence
            .local()
            .set("employees", json!([{"id": "e1", "name": "Binh", "balance": 10}]))
            .await?;
        persistence
            .remote
            .as_ref()
            .unwrap()
            .set("employees", json!({"not": "a list"}))
            .await?;

        let loaded: Option<Vec<Employee>> = persistence.load(Collection::Employees).await?;
        assert_eq!(loaded.map(|list| list.len()), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_session_round_trip_stays_local() -> Result<()> {
        let persistence = mirrored().await?;
        persistence.save_session("session:42", &json!({"x": 1})).await?;

        let loaded: Option<serde_json::Value> = persistence.load_session("session:42").await?;
        assert_eq!(loaded, Some(json!({"x": 1})));
        let remote = persistence.remote.as_ref().unwrap();
        assert_eq!(remote.get("session:42").await?, None);

        persistence.clear_session("session:42").await?;
        let cleared: Option<serde_json::Value> = persistence.load_session("session:42").await?;
        assert!(cleared.is_none());
        Ok(())
    }
}
