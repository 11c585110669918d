//! Process-wide application settings.

use serde::{Deserialize, Serialize};

/// Default charge per meal in whole currency units.
pub const DEFAULT_COST_PER_MEAL: i64 = 35_000;
/// Default theme color name.
pub const DEFAULT_THEME_COLOR: &str = "orange";

/// Single settings instance shared by every operation.
///
/// Missing fields fall back to the defaults, so partially stored settings still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Default charge per meal
    pub cost_per_meal: i64,
    /// Theme color name, see [`crate::core::theme`]
    #[serde(alias = "expenseThemeColor")]
    pub theme_color: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cost_per_meal: DEFAULT_COST_PER_MEAL,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}
