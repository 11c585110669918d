//! Personal fund commands - expenses owned by the logged-in user.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, EMBED_DESCRIPTION_LIMIT, LOGIN_REQUIRED, caller_id, month_or_current,
            truncate_for_embed,
        },
        core::{calendar, expense::NewExpense, report, stats, theme},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;

    /// Parent command for the personal fund.
    #[poise::command(
        slash_command,
        subcommands("fund_add", "fund_remove", "fund_report")
    )]
    pub async fn fund(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Fund command. Available subcommands:\n\
            `/fund add` - Record an expense\n\
            `/fund remove` - Delete one of your expenses\n\
            `/fund report` - Monthly total and weekly breakdown";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records an expense in your fund.
    #[poise::command(slash_command, rename = "add")]
    pub async fn fund_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What the money was spent on"] title: String,
        #[description = "Amount spent"] amount: i64,
        #[description = "Day, YYYY-MM-DD (defaults to today)"] date: Option<String>,
        #[description = "Optional note"] note: Option<String>,
    ) -> Result<()> {
        let date = match date.as_deref().map(calendar::parse_date).transpose() {
            Ok(date) => date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let input = NewExpense {
            date,
            title,
            amount,
            note,
        };
        match ledger.add_expense(&session, input).await {
            Ok(Some(record)) => {
                ctx.say(format!(
                    "✅ Recorded **{}** {} on {} (`{}`).",
                    record.title,
                    report::format_vnd(record.amount),
                    record.date,
                    record.id
                ))
                .await?;
            }
            Ok(None) => {
                ctx.say(LOGIN_REQUIRED).await?;
            }
            Err(e @ (Error::Validation { .. } | Error::InvalidAmount { .. })) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Deletes one of your expenses by id.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn fund_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense id from /fund report"] id: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        match ledger.remove_expense(&session, id.trim()).await {
            Ok(Some(removed)) => {
                ctx.say(format!(
                    "🗑️ Deleted **{}** {}.",
                    removed.title,
                    report::format_vnd(removed.amount)
                ))
                .await?;
            }
            Ok(None) => {
                ctx.say("🔒 You can only delete your own expenses while logged in.")
                    .await?;
            }
            Err(Error::RecordNotFound { id }) => {
                ctx.say(format!("❌ No expense with id `{id}`.")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Shows your fund spending for a month.
    #[poise::command(slash_command, rename = "report")]
    pub async fn fund_report(
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

        let caller = caller_id(ctx);
        let ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;
        let Some(user) = session.user(Utc::now()) else {
            ctx.say(LOGIN_REQUIRED).await?;
            return Ok(());
        };

        let state = ledger.state();
        let summary =
            stats::expense_summary(&state.expense_records, month, Some(user.id.as_str()));
        let text = report::format_expense_summary(&summary)?;

        let embed = serenity::CreateEmbed::default()
            .title(format!("💸 Fund {month}"))
            .description(truncate_for_embed(&text, EMBED_DESCRIPTION_LIMIT))
            .color(theme::palette(&state.settings.theme_color).soft);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
