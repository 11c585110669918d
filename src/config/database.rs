//! Database configuration module.
//!
//! Handles the `SQLite` connection for the local store, the optional remote
//! mirror connection, and creation of the single `app_data` table using
//! `SeaORM`'s `Schema::create_table_from_entity`, so the schema always matches
//! the entity definition without hand-written SQL.

use crate::entities::AppData;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/lunch_buddy.sqlite?mode=rwc";

/// Gets the local database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Gets the remote mirror URL from `REMOTE_DATABASE_URL`.
///
/// The mirror is optional: `None` means the ledger runs local-only.
#[must_use]
pub fn get_remote_database_url() -> Option<String> {
    std::env::var("REMOTE_DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Connects to `database_url` and makes sure the `app_data` table exists.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates the `app_data` table if it is not there yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut app_data_table = schema.create_table_from_entity(AppData);
    app_data_table.if_not_exists();

    db.execute(builder.build(&app_data_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AppDataModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;

        let _: Vec<AppDataModel> = AppData::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<AppDataModel> = AppData::find().limit(1).all(&db).await?;
        Ok(())
    }
}
