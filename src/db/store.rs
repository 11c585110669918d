//! Key-value access over the `app_data` table.

use crate::{
    entities::{AppData, app_data},
    errors::Result,
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};

/// A key-value store backed by one database connection.
///
/// Values are JSON documents; a missing key reads as `None`.
#[derive(Clone, Debug)]
pub struct KvStore {
    db: DatabaseConnection,
    label: &'static str,
}

impl KvStore {
    /// Wraps a connection. `label` only shows up in logs (`"local"`, `"remote"`).
    #[must_use]
    pub const fn new(db: DatabaseConnection, label: &'static str) -> Self {
        Self { db, label }
    }

    /// Name used in log lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<Json>> {
        let row = AppData::find_by_id(key.to_string()).one(&self.db).await?;
        tracing::debug!(store = self.label, key, found = row.is_some(), "kv get");
        Ok(row.map(|row| row.content))
    }

    /// Inserts or replaces the value stored under `key`.
    pub async fn set(&self, key: &str, content: Json) -> Result<()> {
        let row = app_data::ActiveModel {
            id: Set(key.to_string()),
            content: Set(content),
            updated_at: Set(chrono::Utc::now()),
        };

        AppData::insert(row)
            .on_conflict(
                OnConflict::column(app_data::Column::Id)
                    .update_columns([app_data::Column::Content, app_data::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!(store = self.label, key, "kv set");
        Ok(())
    }

    /// Deletes `key`. Deleting a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        AppData::delete_by_id(key.to_string()).exec(&self.db).await?;
        tracing::debug!(store = self.label, key, "kv remove");
        Ok(())
    }

    /// Last write time of `key`, if it exists.
    pub async fn updated_at(&self, key: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
        let row = AppData::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(row.map(|row| row.updated_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_key_is_none() -> Result<()> {
        let store = KvStore::new(setup_test_db().await?, "local");
        assert_eq!(store.get("employees").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get() -> Result<()> {
        let store = KvStore::new(setup_test_db().await?, "local");
        store.set("employees", json!([{"id": "1", "name": "An", "balance": 0}])).await?;

        let value = store.get("employees").await?;
        assert_eq!(value, Some(json!([{"id": "1", "name": "An", "balance": 0}])));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() -> Result<()> {
        let store = KvStore::new(setup_test_db().await?, "local");
        store.set("settings", json!({"costPerMeal": 30000})).await?;
        let first_write = store.updated_at("settings").await?;

        store.set("settings", json!({"costPerMeal": 40000})).await?;

        assert_eq!(store.get("settings").await?, Some(json!({"costPerMeal": 40000})));
        assert!(store.updated_at("settings").await? >= first_write);
        let rows = AppData::find().all(store.connection()).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_key() -> Result<()> {
        let store = KvStore::new(setup_test_db().await?, "local");
        store.set("session:1", json!({"a": 1})).await?;
        store.remove("session:1").await?;
        store.remove("session:1").await?;

        assert_eq!(store.get("session:1").await?, None);
        Ok(())
    }
}
