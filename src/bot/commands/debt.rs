//! Debt book commands - money borrowed from or lent to other people.
//!
//! Every entry belongs to the logged-in user who created it; only they can
//! change it.

use crate::models::DebtKind;

/// Slash-command choice for the debt direction.
#[derive(Clone, Copy, Debug, poise::ChoiceParameter)]
pub enum DebtKindChoice {
    /// I borrowed money
    #[name = "borrow"]
    Borrow,
    /// I lent money
    #[name = "lend"]
    Lend,
}

impl From<DebtKindChoice> for DebtKind {
    fn from(choice: DebtKindChoice) -> Self {
        match choice {
            DebtKindChoice::Borrow => Self::Borrow,
            DebtKindChoice::Lend => Self::Lend,
        }
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::DebtKindChoice;
    use crate::{
        bot::{
            BotData, EMBED_DESCRIPTION_LIMIT, LOGIN_REQUIRED, caller_id, month_or_current,
            truncate_for_embed,
        },
        core::{
            calendar,
            debt::{DebtUpdate, NewDebt},
            report, stats, theme,
        },
        errors::{Error, Result},
        models::{DebtKind, DebtRecord},
    };
    use chrono::{NaiveDate, Utc};
    use poise::serenity_prelude as serenity;

    const NOT_OWNER: &str = "🔒 You can only change your own debt entries while logged in.";

    async fn reply_with_record(
        ctx: poise::Context<'_, BotData, Error>,
        outcome: Result<Option<DebtRecord>>,
        verb: &str,
    ) -> Result<()> {
        match outcome {
            Ok(Some(record)) => {
                ctx.say(format!("✅ {verb}: {}", report::format_debt_line(&record)))
                    .await?;
            }
            Ok(None) => {
                ctx.say(NOT_OWNER).await?;
            }
            Err(Error::RecordNotFound { id }) => {
                ctx.say(format!("❌ No debt entry with id `{id}`.")).await?;
            }
            Err(e @ (Error::Validation { .. } | Error::InvalidAmount { .. })) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn parse_optional_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
        input.map(calendar::parse_date).transpose()
    }

    /// Parent command for the debt book.
    #[poise::command(
        slash_command,
        subcommands("debt_add", "debt_pay", "debt_edit", "debt_remove", "debt_list")
    )]
    pub async fn debt(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Debt book command. Available subcommands:\n\
            `/debt add` - Record money you borrowed or lent\n\
            `/debt pay` - Record a repayment\n\
            `/debt edit` - Change an entry\n\
            `/debt remove` - Delete an entry\n\
            `/debt list` - Show your debt book";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records money you borrowed or lent.
    #[poise::command(slash_command, rename = "add")]
    pub async fn debt_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Borrowed or lent"] kind: DebtKindChoice,
        #[description = "Who the money is with"] person: String,
        #[description = "Principal"] amount: i64,
        #[description = "Already paid back (defaults to 0)"] paid: Option<i64>,
        #[description = "Start day, YYYY-MM-DD (defaults to today)"] start: Option<String>,
        #[description = "Due day, YYYY-MM-DD"] due: Option<String>,
        #[description = "Optional note"] note: Option<String>,
    ) -> Result<()> {
        let dates = parse_optional_date(start.as_deref())
            .and_then(|start| Ok((start, parse_optional_date(due.as_deref())?)));
        let (start_date, due_date) = match dates {
            Ok(dates) => dates,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let input = NewDebt {
            kind: kind.into(),
            person_name: person,
            amount,
            paid_amount: paid.unwrap_or(0),
            start_date: start_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            due_date,
            note: note.unwrap_or_default(),
        };

        match ledger.add_debt(&session, input).await {
            Ok(None) => {
                ctx.say(LOGIN_REQUIRED).await?;
                Ok(())
            }
            outcome => reply_with_record(ctx, outcome, "Added").await,
        }
    }

    /// Records a repayment on one of your entries.
    #[poise::command(slash_command, rename = "pay")]
    pub async fn debt_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry id from /debt list"] id: String,
        #[description = "Amount paid back"] amount: i64,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let outcome = ledger
            .record_debt_payment(&session, id.trim(), amount)
            .await;
        reply_with_record(ctx, outcome, "Payment recorded").await
    }

    /// Changes one of your entries. Omitted fields stay as they are.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn debt_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry id from /debt list"] id: String,
        #[description = "New counterparty"] person: Option<String>,
        #[description = "New principal"] amount: Option<i64>,
        #[description = "New total paid back"] paid: Option<i64>,
        #[description = "New start day, YYYY-MM-DD"] start: Option<String>,
        #[description = "New due day, YYYY-MM-DD, or 'none' to clear"] due: Option<String>,
        #[description = "New note"] note: Option<String>,
    ) -> Result<()> {
        let due_date = match due.as_deref().map(str::trim) {
            None => Ok(None),
            Some(value) if value.eq_ignore_ascii_case("none") => Ok(Some(None)),
            Some(value) => calendar::parse_date(value).map(|date| Some(Some(date))),
        };
        let dates = parse_optional_date(start.as_deref())
            .and_then(|start_date| Ok((start_date, due_date?)));
        let (start_date, due_date) = match dates {
            Ok(dates) => dates,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let update = DebtUpdate {
            person_name: person,
            amount,
            paid_amount: paid,
            start_date,
            due_date,
            note,
        };
        let outcome = ledger.update_debt(&session, id.trim(), update).await;
        reply_with_record(ctx, outcome, "Updated").await
    }

    /// Deletes one of your entries.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn debt_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry id from /debt list"] id: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let outcome = ledger.remove_debt(&session, id.trim()).await;
        reply_with_record(ctx, outcome, "Deleted").await
    }

    /// Shows your debt book with totals.
    #[poise::command(slash_command, rename = "list")]
    pub async fn debt_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month for the started-this-month totals, YYYY-MM"] month: Option<String>,
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
        let mut text = String::new();
        for kind in [DebtKind::Borrow, DebtKind::Lend] {
            let summary = stats::debt_summary(&state.debt_records, &user.id, kind);
            text.push_str(&report::format_debt_summary(&summary)?);
            text.push('\n');
        }

        let totals = stats::monthly_debt_totals(&state.debt_records, &user.id, month);
        let embed = serenity::CreateEmbed::default()
            .title("📒 Debt book")
            .description(truncate_for_embed(&text, EMBED_DESCRIPTION_LIMIT))
            .color(theme::palette(&state.settings.theme_color).accent)
            .field(
                format!("Started in {month}"),
                format!(
                    "Borrowed {}, lent {}",
                    report::format_vnd(totals.borrowed),
                    report::format_vnd(totals.lent)
                ),
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
