//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `LunchBuddy` application,
//! including all slash commands, autocomplete handlers, and bot context management.
//! Commands are thin adapters: they resolve the caller's session, call the
//! [`Ledger`], and turn the result into a reply.

/// Discord command implementations (auth, employees, lunches, fund, debts, data)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::{
        calendar::YearMonth,
        ledger::Ledger,
        matcher::GeminiMatcher,
        state::AppState,
    },
    errors::{Error, Result},
    models::Employee,
};
use poise::serenity_prelude as serenity;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::info;

/// Shared data available to all bot commands.
///
/// The ledger sits behind one async mutex, so every mutation runs to
/// completion before the next one starts.
pub struct BotData {
    /// Application state and its persistence
    pub ledger: Mutex<Ledger>,
    /// Payment matcher, absent when no API key is configured
    pub matcher: Option<GeminiMatcher>,
    scanning: AtomicBool,
}

impl BotData {
    /// Creates a new `BotData` instance around a loaded ledger.
    #[must_use]
    pub fn new(ledger: Ledger, matcher: Option<GeminiMatcher>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            matcher,
            scanning: AtomicBool::new(false),
        }
    }

    /// Marks a payment scan as running. Returns `None` if one already is.
    ///
    /// The scan stays marked until the returned guard is dropped.
    #[must_use]
    pub fn begin_scan(&self) -> Option<ScanGuard<'_>> {
        self.scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ScanGuard {
                flag: &self.scanning,
            })
    }
}

/// Clears the in-flight scan flag on drop.
pub struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Session key of the command author.
#[must_use]
pub fn caller_id(ctx: poise::Context<'_, BotData, Error>) -> String {
    ctx.author().id.to_string()
}

/// Reply sent when the gate refused a mutation.
pub const ADMIN_REQUIRED: &str = "🔒 This needs an admin login. Use `/login` first.";
/// Reply sent when a logged-in user is required.
pub const LOGIN_REQUIRED: &str = "🔒 Please `/login` or `/register` first.";

/// Longest embed description Discord accepts.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Shortens `text` to at most `limit` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_for_embed(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Finds an employee by exact id or by name (case-insensitive).
#[must_use]
pub fn find_employee<'a>(state: &'a AppState, name_or_id: &str) -> Option<&'a Employee> {
    state
        .employee(name_or_id.trim())
        .or_else(|| state.employee_by_name(name_or_id))
}

/// Parses an optional `YYYY-MM` argument, defaulting to the current local month.
///
/// # Errors
/// Returns a validation error for a malformed month.
pub fn month_or_current(month: Option<&str>) -> Result<YearMonth> {
    month.map_or_else(
        || Ok(YearMonth::of(chrono::Local::now().date_naive())),
        YearMonth::parse,
    )
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                tracing::error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns the framework error if the client cannot be created or exits with an error.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::login(),
                commands::register(),
                commands::logout(),
                commands::whoami(),
                commands::employee(),
                commands::lunch(),
                commands::stats(),
                commands::fund(),
                commands::debt(),
                commands::scan(),
                commands::data(),
                commands::settings(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| tracing::error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| tracing::error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
