/// Database configuration and connection management
pub mod database;

/// Application configuration from config.toml and environment secrets
pub mod app;

pub use app::{AppConfig, load_app_configuration};
