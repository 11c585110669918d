//! App data entity - the key-value table every collection is persisted into.
//!
//! Each row holds one logical collection (`employees`, `lunchRecords`, ...) or a
//! session, keyed by its name. The same shape is used for the local store and
//! the optional remote mirror, so a row is `{ id, content, updated_at }` on both.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_data")]
pub struct Model {
    /// Collection or session key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// JSON-serialized collection
    pub content: Json,
    /// When this key was last written
    pub updated_at: DateTimeUtc,
}

/// `AppData` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
