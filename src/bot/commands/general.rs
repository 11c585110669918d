//! General Discord commands - ping and help.
//! These commands don't touch the ledger.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**LunchBuddy Help**\n\
        Shared lunch bookkeeping, a personal fund and a debt book.\n\n\
        **Account**\n\
        • `/login <username> <password>` / `/register` / `/logout` / `/whoami`\n\n\
        **Lunch (admin)**\n\
        • `/lunch set <date> <entries>` - Record who ate, e.g. `Lan, Minh=40000`\n\
        • `/lunch clear <date>` - Remove a day and refund its meals\n\
        • `/lunch show <date>` - Show a day\n\
        • `/employee add|remove|list|adjust|pay` - Manage employees and balances\n\
        • `/scan <text>` - Match a bank notification to an employee\n\
        • `/stats [month]` - Monthly overview and weekly breakdown\n\n\
        **Personal**\n\
        • `/fund add|remove|report` - Your fund expenses\n\
        • `/debt add|pay|edit|remove|list` - Your debt book\n\n\
        **Data**\n\
        • `/data export|import|reset|logs` - Backups and activity log\n\
        • `/settings [cost_per_meal] [theme_color]` - Show or change settings\n\n\
        Dates are `YYYY-MM-DD`, months are `YYYY-MM`.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
