//! Entity module - SeaORM entity definitions for the database.
//! The ledger keeps its collections as JSON documents, so a single key-value
//! table is all the schema there is.

pub mod app_data;

pub use app_data::{Column as AppDataColumn, Entity as AppData, Model as AppDataModel};
