//! Lunch commands - record, clear and show the meals of a day.
//!
//! `/lunch set` replaces the whole list for the day; balances move by the
//! difference between the old and new price of every employee.

use crate::{
    bot::find_employee,
    core::state::AppState,
    errors::{Error, Result},
    models::LunchItem,
};

/// Parses `"Lan, Minh=40000"` style entries into lunch items.
///
/// An entry without `=price` is charged `default_price`. Names resolve to
/// employees by id or case-insensitive name.
///
/// # Errors
/// Returns [`Error::Validation`] for unknown employees or unreadable prices.
pub fn parse_entries(input: &str, state: &AppState, default_price: i64) -> Result<Vec<LunchItem>> {
    input
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, price) = match entry.split_once('=') {
                Some((name, price)) => {
                    let digits: String = price.trim().chars().filter(|c| *c != '.').collect();
                    let price = digits.parse::<i64>().map_err(|_| Error::Validation {
                        message: format!("invalid price in '{entry}'"),
                    })?;
                    (name.trim(), price)
                }
                None => (entry, default_price),
            };
            let employee = find_employee(state, name).ok_or_else(|| Error::Validation {
                message: format!("unknown employee '{name}'"),
            })?;
            Ok(LunchItem::new(employee.id.clone(), price))
        })
        .collect()
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::parse_entries;
    use crate::{
        bot::{ADMIN_REQUIRED, BotData, caller_id},
        core::{balance::LunchUpdate, calendar, report, state::AppState, stats, theme},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn describe_update(state: &AppState, update: &LunchUpdate) -> Result<String> {
        let mut out = if update.stored {
            format!("✅ Saved lunch for {}.", update.date)
        } else {
            format!("🗑️ Cleared lunch for {}.", update.date)
        };
        for delta in &update.deltas {
            let name = state
                .employee(&delta.employee_id)
                .map_or(delta.employee_id.as_str(), |e| e.name.as_str());
            write!(
                out,
                "\n• {name}: {} → {}",
                report::format_balance(delta.delta),
                report::format_balance(delta.new_balance)
            )?;
        }
        if !update.orphaned.is_empty() {
            write!(
                out,
                "\n⚠️ {} item(s) belong to removed employees and were not charged.",
                update.orphaned.len()
            )?;
        }
        Ok(out)
    }

    /// Parent command for recording lunches.
    #[poise::command(
        slash_command,
        subcommands("lunch_set", "lunch_clear", "lunch_show")
    )]
    pub async fn lunch(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Lunch command. Available subcommands:\n\
            `/lunch set` - Replace the meals of a day\n\
            `/lunch clear` - Remove a day and refund its meals\n\
            `/lunch show` - Show the meals of a day";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Replaces the meals of a day.
    #[poise::command(slash_command, rename = "set")]
    pub async fn lunch_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day, YYYY-MM-DD"] date: String,
        #[description = "Who ate, e.g. 'Lan, Minh=40000' (default price = cost per meal)"]
        entries: String,
    ) -> Result<()> {
        let date = match calendar::parse_date(&date) {
            Ok(date) => date,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let items = match parse_entries(&entries, ledger.state(), ledger.settings().cost_per_meal)
        {
            Ok(items) => items,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        match ledger.save_lunch(&session, date, items).await {
            Ok(Some(update)) => {
                let text = describe_update(ledger.state(), &update)?;
                ctx.say(text).await?;
            }
            Ok(None) => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
            Err(e @ (Error::Validation { .. } | Error::InvalidAmount { .. })) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Removes a day and refunds every meal on it.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn lunch_clear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day, YYYY-MM-DD"] date: String,
    ) -> Result<()> {
        let date = match calendar::parse_date(&date) {
            Ok(date) => date,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        match ledger.save_lunch(&session, date, Vec::new()).await? {
            Some(update) => {
                let text = describe_update(ledger.state(), &update)?;
                ctx.say(text).await?;
            }
            None => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
        }
        Ok(())
    }

    /// Shows the meals recorded for a day.
    #[poise::command(slash_command, rename = "show")]
    pub async fn lunch_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day, YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let date = match date.as_deref().map(calendar::parse_date).transpose() {
            Ok(date) => date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let ledger = ctx.data().ledger.lock().await;
        let state = ledger.state();

        let Some(record) = state.lunch_record(date) else {
            ctx.say(format!("No lunch recorded for {date}.")).await?;
            return Ok(());
        };

        let embed_fields: Vec<(String, String, bool)> = record
            .items
            .iter()
            .take(25)
            .map(|item| {
                let name = state
                    .employee(&item.employee_id)
                    .map_or_else(|| "(removed employee)".to_string(), |e| e.name.clone());
                let value = item.note.as_ref().map_or_else(
                    || report::format_vnd(item.price),
                    |note| format!("{} - {note}", report::format_vnd(item.price)),
                );
                (name, value, true)
            })
            .collect();

        let total = stats::saturating_total(record.items.iter().map(|item| item.price));
        let embed = serenity::CreateEmbed::default()
            .title(format!("🍱 Lunch {date}"))
            .color(theme::palette(&state.settings.theme_color).accent)
            .fields(embed_fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} meals, total {}",
                record.items.len(),
                report::format_vnd(total)
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::Employee;

    fn state() -> AppState {
        AppState {
            employees: vec![
                Employee {
                    id: "e1".to_string(),
                    name: "Lan".to_string(),
                    balance: 0,
                },
                Employee {
                    id: "e2".to_string(),
                    name: "Minh".to_string(),
                    balance: 0,
                },
            ],
            ..AppState::default()
        }
    }

    #[test]
    fn test_parse_entries_default_and_explicit_price() {
        let items = parse_entries("Lan, minh=40.000", &state(), 35_000).unwrap();
        assert_eq!(
            items,
            vec![LunchItem::new("e1", 35_000), LunchItem::new("e2", 40_000)]
        );
    }

    #[test]
    fn test_parse_entries_empty_input_clears() {
        assert!(parse_entries(" , ", &state(), 35_000).unwrap().is_empty());
    }

    #[test]
    fn test_parse_entries_rejects_unknown_and_bad_price() {
        assert!(matches!(
            parse_entries("Lan, Tuan", &state(), 35_000),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            parse_entries("Lan=abc", &state(), 35_000),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_parse_entries_keeps_negative_price_for_validation() {
        let items = parse_entries("Lan=-5000", &state(), 35_000).unwrap();
        assert_eq!(items[0].price, -5_000);
    }
}
