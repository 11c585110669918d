//! Application configuration loading from config.toml and the environment.
//!
//! Non-secret tuning lives in an optional `config.toml`; every field has a
//! default so the bot starts without one. Secrets and connection strings are
//! read from environment variables (usually populated from `.env`).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_MATCHER_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_MATCHER_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest session lifetime accepted in `[auth]`.
pub const MAX_SESSION_DAYS: i64 = 3650;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Values used to seed settings and reset them
    pub defaults: DefaultsConfig,
    /// Account and session tuning
    pub auth: AuthConfig,
    /// External payment matcher
    pub matcher: MatcherConfig,
}

/// `[defaults]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default charge per meal
    pub cost_per_meal: i64,
    /// Default theme color name
    pub theme_color: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let settings = crate::models::AppSettings::default();
        Self {
            cost_per_meal: settings.cost_per_meal,
            theme_color: settings.theme_color,
        }
    }
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fixed session lifetime in days, counted from login
    pub session_days: i64,
    /// Username of the seeded administrator
    pub admin_username: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: 7,
            admin_username: "admin".to_string(),
        }
    }
}

/// `[matcher]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Model name passed to the `generateContent` endpoint
    pub model: String,
    /// API base URL
    pub endpoint: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MATCHER_MODEL.to_string(),
            endpoint: DEFAULT_MATCHER_ENDPOINT.to_string(),
        }
    }
}

impl AppConfig {
    /// Settings used when nothing is stored yet and after a reset.
    #[must_use]
    pub fn default_settings(&self) -> crate::models::AppSettings {
        crate::models::AppSettings {
            cost_per_meal: self.defaults.cost_per_meal,
            theme_color: self.defaults.theme_color.clone(),
        }
    }
}

/// Parses configuration from a TOML string.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.defaults.cost_per_meal < 0 {
        return Err(Error::Config {
            message: "defaults.cost_per_meal must not be negative".to_string(),
        });
    }
    if !(1..=MAX_SESSION_DAYS).contains(&config.auth.session_days) {
        return Err(Error::Config {
            message: format!("auth.session_days must be between 1 and {MAX_SESSION_DAYS}"),
        });
    }
    if config.auth.admin_username.trim().is_empty() {
        return Err(Error::Config {
            message: "auth.admin_username cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Loads configuration from a TOML file, falling back to defaults when it does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::info!("No configuration file at {:?}, using defaults", path_ref);
        return Ok(AppConfig::default());
    }

    tracing::debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `CONFIG_PATH`, or `./config.toml` when unset.
///
/// # Errors
/// Returns an error if the file exists but is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

/// Password for the seeded administrator, from `LUNCH_ADMIN_PASSWORD`.
///
/// Falls back to `"admin"` with a warning so a fresh install can log in once.
#[must_use]
pub fn admin_password() -> String {
    std::env::var("LUNCH_ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("LUNCH_ADMIN_PASSWORD not set, seeding admin with the default password");
        "admin".to_string()
    })
}

/// Gemini API key from `GEMINI_API_KEY`; `None` disables the payment scanner.
#[must_use]
pub fn matcher_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [defaults]
            cost_per_meal = 40000
            theme_color = "teal"

            [auth]
            session_days = 3
            admin_username = "boss"

            [matcher]
            model = "gemini-test"
            endpoint = "http://localhost:9000"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.defaults.cost_per_meal, 40_000);
        assert_eq!(config.defaults.theme_color, "teal");
        assert_eq!(config.auth.session_days, 3);
        assert_eq!(config.auth.admin_username, "boss");
        assert_eq!(config.matcher.model, "gemini-test");
        assert_eq!(config.matcher.endpoint, "http://localhost:9000");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[auth]\nsession_days = 14\n").unwrap();
        assert_eq!(config.auth.session_days, 14);
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(config.defaults.cost_per_meal, 35_000);
        assert_eq!(config.defaults.theme_color, "orange");
        assert_eq!(config.matcher.model, DEFAULT_MATCHER_MODEL);
    }

    #[test]
    fn test_rejects_non_positive_session_days() {
        let result = parse_config("[auth]\nsession_days = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_oversized_session_days() {
        let result = parse_config("[auth]\nsession_days = 3651\n");
        assert!(matches!(result, Err(Error::Config { .. })));

        let config = parse_config("[auth]\nsession_days = 3650\n").unwrap();
        assert_eq!(config.auth.session_days, MAX_SESSION_DAYS);
    }

    #[test]
    fn test_rejects_negative_meal_cost() {
        let result = parse_config("[defaults]\ncost_per_meal = -1\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.auth.session_days, 7);
    }
}
