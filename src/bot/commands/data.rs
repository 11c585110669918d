//! Data commands - backups, reset, the activity log and settings.

/// Largest backup file accepted for import.
pub const MAX_BACKUP_BYTES: u32 = 5 * 1024 * 1024;

/// Default and maximum number of log lines shown by `/data logs`.
pub const LOG_PAGE: usize = 20;

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{LOG_PAGE, MAX_BACKUP_BYTES};
    use crate::{
        bot::{
            ADMIN_REQUIRED, BotData, EMBED_DESCRIPTION_LIMIT, caller_id,
            handlers::autocomplete, truncate_for_embed,
        },
        core::{
            backup::{self, Confirmation},
            ledger::SettingsUpdate,
            logs, report, theme,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    const fn confirmation(confirm: Option<bool>) -> Confirmation {
        match confirm {
            Some(true) => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }

    /// Parent command for backups and the activity log.
    #[poise::command(
        slash_command,
        subcommands("data_export", "data_import", "data_reset", "data_logs")
    )]
    pub async fn data(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Data command. Available subcommands:\n\
            `/data export` - Download a backup of everything\n\
            `/data import` - Replace current data with a backup (admin)\n\
            `/data reset` - Wipe everything back to defaults (admin)\n\
            `/data logs` - Show recent activity";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Downloads a JSON backup of every collection. Accounts are only included for admins.
    #[poise::command(slash_command, rename = "export")]
    pub async fn data_export(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = caller_id(ctx);
        let snapshot = {
            let ledger = ctx.data().ledger.lock().await;
            let session = ledger.session(&caller).await?;
            ledger.export(&session)
        };
        let json = backup::snapshot_to_json(&snapshot)?;
        let file_name = backup::export_file_name(chrono::Local::now().date_naive());

        tracing::info!(file_name = file_name.as_str(), bytes = json.len(), "Exporting backup");
        ctx.send(
            poise::CreateReply::default()
                .content("📦 Backup of all data.")
                .attachment(serenity::CreateAttachment::bytes(json.into_bytes(), file_name))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Replaces current data with an uploaded backup.
    #[poise::command(slash_command, rename = "import")]
    pub async fn data_import(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Backup file from /data export"] file: serenity::Attachment,
        #[description = "Overwrite current data (required)"] confirm: Option<bool>,
    ) -> Result<()> {
        if file.size > MAX_BACKUP_BYTES {
            ctx.say("❌ That file is too large to be a backup.").await?;
            return Ok(());
        }
        if confirmation(confirm) == Confirmation::Declined {
            ctx.say(
                "⚠️ Importing replaces every collection in the file. \
                 Run again with `confirm: True` to overwrite current data.",
            )
            .await?;
            return Ok(());
        }

        ctx.defer().await?;
        let bytes = file.download().await?;
        let snapshot = match std::str::from_utf8(&bytes)
            .map_err(|e| Error::InvalidBackup {
                message: e.to_string(),
            })
            .and_then(backup::parse_snapshot)
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        match ledger
            .import(&session, snapshot, Confirmation::Confirmed)
            .await?
        {
            Some(outcome) => {
                ctx.say(format!(
                    "✅ Imported {}: replaced {}.",
                    file.filename,
                    outcome.replaced.join(", ")
                ))
                .await?;
            }
            None => {
                ctx.say(ADMIN_REQUIRED).await?;
            }
        }
        Ok(())
    }

    /// Wipes every collection back to its defaults.
    #[poise::command(slash_command, rename = "reset")]
    pub async fn data_reset(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Delete everything (required)"] confirm: Option<bool>,
    ) -> Result<()> {
        let confirmation = confirmation(confirm);
        if confirmation == Confirmation::Declined {
            ctx.say("⚠️ This deletes all data. Run again with `confirm: True` to proceed.")
                .await?;
            return Ok(());
        }

        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;
        let session = ledger.session(&caller).await?;

        if ledger.reset(&session, confirmation).await? {
            ctx.say("🧹 All data was reset to defaults.").await?;
        } else {
            ctx.say(ADMIN_REQUIRED).await?;
        }
        Ok(())
    }

    /// Shows the most recent activity log entries.
    #[poise::command(slash_command, rename = "logs")]
    pub async fn data_logs(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many entries (max 20)"] limit: Option<u8>,
    ) -> Result<()> {
        let limit = limit.map_or(LOG_PAGE, usize::from).clamp(1, LOG_PAGE);
        let ledger = ctx.data().ledger.lock().await;
        let state = ledger.state();

        let entries = logs::newest_first(&state.logs, limit);
        if entries.is_empty() {
            ctx.say("No activity recorded yet.").await?;
            return Ok(());
        }

        let text = entries
            .into_iter()
            .map(report::format_log_line)
            .collect::<Vec<_>>()
            .join("\n");
        let embed = serenity::CreateEmbed::default()
            .title("📜 Activity log")
            .description(truncate_for_embed(&text, EMBED_DESCRIPTION_LIMIT))
            .color(theme::palette(&state.settings.theme_color).soft);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the settings, or changes them when values are given (admin).
    #[poise::command(slash_command, prefix_command)]
    pub async fn settings(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Default charge per meal"] cost_per_meal: Option<i64>,
        #[description = "Theme color"]
        #[autocomplete = "autocomplete::autocomplete_theme_color"]
        theme_color: Option<String>,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;

        let settings = if cost_per_meal.is_none() && theme_color.is_none() {
            ledger.settings().clone()
        } else {
            let session = ledger.session(&caller).await?;
            let update = SettingsUpdate {
                cost_per_meal,
                theme_color,
            };
            match ledger.update_settings(&session, update).await {
                Ok(Some(settings)) => settings,
                Ok(None) => {
                    ctx.say(ADMIN_REQUIRED).await?;
                    return Ok(());
                }
                Err(e @ (Error::Validation { .. } | Error::InvalidAmount { .. })) => {
                    ctx.say(format!("❌ {e}")).await?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        };

        let palette = theme::palette(&settings.theme_color);
        let embed = serenity::CreateEmbed::default()
            .title("⚙️ Settings")
            .color(palette.accent)
            .field("Cost per meal", report::format_vnd(settings.cost_per_meal), true)
            .field(
                "Theme",
                format!("{} {}", palette.marker, palette.name),
                true,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
