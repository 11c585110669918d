//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, errors::Error};

/// Provides autocomplete suggestions for employee names.
///
/// Matches the partial input case-insensitively anywhere in the name and
/// returns up to 25 names, sorted alphabetically.
pub async fn autocomplete_employee_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let ledger = ctx.data().ledger.lock().await;
    matching_names(
        ledger.state().employees.iter().map(|e| e.name.as_str()),
        partial,
    )
}

/// Names containing `partial`, capped at Discord's 25-choice limit.
pub fn matching_names<'a>(names: impl Iterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(25) // Discord autocomplete limit
        .collect();

    matching.sort();
    matching
}

/// Provides autocomplete suggestions for theme color names.
pub async fn autocomplete_theme_color(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_names(crate::core::theme::color_names(), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_names_filters_and_sorts() {
        let names = ["Minh", "Lan", "Hoang Lan", "An"];
        let result = matching_names(names.into_iter(), "LAN");
        assert_eq!(result, vec!["Hoang Lan".to_string(), "Lan".to_string()]);
    }

    #[test]
    fn test_matching_names_caps_at_25() {
        let names: Vec<String> = (0..40).map(|i| format!("Employee {i:02}")).collect();
        let result = matching_names(names.iter().map(String::as_str), "");
        assert_eq!(result.len(), 25);
    }
}
