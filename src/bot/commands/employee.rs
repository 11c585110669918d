//! Employee commands - roster management and balance corrections.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{ADMIN_REQUIRED, BotData, caller_id, find_employee, handlers::autocomplete},
        core::{report, stats, theme},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for managing employees and their balances.
    #[poise::command(
        slash_command,
        subcommands(
            "employee_add",
            "employee_remove",
            "employee_list",
            "employee_adjust",
            "employee_pay"
        )
    )]
    pub async fn employee(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Employee management command. Available subcommands:\n\
            `/employee add` - Add an employee\n\
            `/employee remove` - Remove an employee\n\
            `/employee list` - List employees and balances\n\
            `/employee adjust` - Apply a signed balance correction\n\
            `/employee pay` - Record a top-up payment";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds an employee with a zero balance.
    #[poise::command(slash_command, rename = "add")]
    pub async fn employee_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] name: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        match ledger.add_employee(&session, &name).await {
            Ok(Some(employee)) => {
                ctx.say(format!("✅ Added **{}**.", employee.name)).await?;
            }
            Ok(None) => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
            Err(e @ Error::Validation { .. }) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Removes an employee. Their past meals stay on record.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn employee_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee to remove"]
        #[autocomplete = "autocomplete::autocomplete_employee_name"]
        name: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let Some(employee_id) = find_employee(ledger.state(), &name).map(|e| e.id.clone()) else {
            ctx.say(format!("❌ Employee '{name}' not found.")).await?;
            return Ok(());
        };

        match ledger.remove_employee(&session, &employee_id).await? {
            Some(removed) => {
                ctx.say(format!(
                    "🗑️ Removed **{}** (final balance {}).",
                    removed.name,
                    report::format_balance(removed.balance)
                ))
                .await?;
            }
            None => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
        }
        Ok(())
    }

    /// Lists every employee with their current balance.
    #[poise::command(slash_command, rename = "list")]
    pub async fn employee_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let ledger = ctx.data().ledger.lock().await;
        let state = ledger.state();

        if state.employees.is_empty() {
            ctx.say("No employees yet. Use `/employee add` to create some!")
                .await?;
            return Ok(());
        }

        let mut employees: Vec<_> = state.employees.iter().collect();
        employees.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let embed_fields: Vec<(String, String, bool)> = employees
            .into_iter()
            .take(25) // Discord embed field limit
            .map(|e| (e.name.clone(), report::format_balance(e.balance), true))
            .collect();

        let total = stats::saturating_total(state.employees.iter().map(|e| e.balance));
        let list_embed = serenity::CreateEmbed::default()
            .title("**Employees**")
            .color(theme::palette(&state.settings.theme_color).accent)
            .fields(embed_fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Sum of balances: {}",
                report::format_balance(total)
            )));

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Applies a signed correction to an employee balance.
    #[poise::command(slash_command, rename = "adjust")]
    pub async fn employee_adjust(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee to adjust"]
        #[autocomplete = "autocomplete::autocomplete_employee_name"]
        name: String,
        #[description = "Signed amount to add, e.g. -20000"] amount: i64,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let Some(employee_id) = find_employee(ledger.state(), &name).map(|e| e.id.clone()) else {
            ctx.say(format!("❌ Employee '{name}' not found.")).await?;
            return Ok(());
        };

        match ledger.adjust_balance(&session, &employee_id, amount).await {
            Ok(Some(employee)) => {
                ctx.say(format!(
                    "✅ **{}** balance is now {}.",
                    employee.name,
                    report::format_balance(employee.balance)
                ))
                .await?;
            }
            Ok(None) => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
            Err(e @ Error::InvalidAmount { .. }) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Records money an employee paid into the lunch fund.
    #[poise::command(slash_command, rename = "pay")]
    pub async fn employee_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee who paid"]
        #[autocomplete = "autocomplete::autocomplete_employee_name"]
        name: String,
        #[description = "Amount paid"] amount: i64,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        let Some(employee_id) = find_employee(ledger.state(), &name).map(|e| e.id.clone()) else {
            ctx.say(format!("❌ Employee '{name}' not found.")).await?;
            return Ok(());
        };

        match ledger.record_payment(&session, &employee_id, amount).await {
            Ok(Some(employee)) => {
                ctx.say(format!(
                    "💰 Credited {} to **{}**, balance {}.",
                    report::format_vnd(amount),
                    employee.name,
                    report::format_balance(employee.balance)
                ))
                .await?;
            }
            Ok(None) => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
            Err(e @ Error::InvalidAmount { .. }) => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

pub use inner::*;
