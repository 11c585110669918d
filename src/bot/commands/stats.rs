//! Monthly lunch statistics.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, EMBED_DESCRIPTION_LIMIT, month_or_current, truncate_for_embed},
        core::{report, stats, theme},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows who ate how much in a month, with a weekly breakdown.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stats(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month, YYYY-MM (defaults to this month)"] month: Option<String>,
    ) -> Result<()> {
        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let ledger = ctx.data().ledger.lock().await;
        let state = ledger.state();

        let overview = stats::employee_overview(&state.employees, &state.lunch_records, month);
        let weeks = stats::weekly_lunch_spend(&state.lunch_records, month);
        let text = report::format_monthly_stats(&overview, &weeks, &state.employees)?;

        let orphaned = stats::orphaned_items(&state.employees, &state.lunch_records)
            .into_iter()
            .filter(|item| month.contains(item.date))
            .collect::<Vec<_>>();

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📊 Lunch {month}"))
            .description(truncate_for_embed(&text, EMBED_DESCRIPTION_LIMIT))
            .color(theme::palette(&state.settings.theme_color).accent);

        if !orphaned.is_empty() {
            let total = stats::saturating_total(orphaned.iter().map(|item| item.price));
            embed = embed.field(
                "Removed employees",
                format!(
                    "{} meal(s), {} not charged to anyone",
                    orphaned.len(),
                    report::format_vnd(total)
                ),
                false,
            );
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
