//! Account commands - login, register, logout and whoami.
//!
//! Replies are ephemeral so credentials and role details stay with the caller.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller_id},
        errors::{Error, Result},
    };
    use chrono::Utc;

    async fn reply_private(ctx: poise::Context<'_, BotData, Error>, text: String) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .content(text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Logs in with a username and password.
    #[poise::command(slash_command)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account name"] username: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let ledger = ctx.data().ledger.lock().await;

        match ledger.login(&caller, &username, &password).await {
            Ok(user) => {
                reply_private(
                    ctx,
                    format!("✅ Logged in as **{}** ({}).", user.username, user.role.as_str()),
                )
                .await
            }
            Err(Error::InvalidCredentials) => {
                reply_private(ctx, "❌ Invalid username or password.".to_string()).await
            }
            Err(e) => Err(e),
        }
    }

    /// Creates a new account and logs into it.
    #[poise::command(slash_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account name"] username: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let caller = caller_id(ctx);
        let mut ledger = ctx.data().ledger.lock().await;

        match ledger.register(&caller, &username, &password).await {
            Ok(user) => {
                reply_private(ctx, format!("✅ Account **{}** created.", user.username)).await
            }
            Err(e @ (Error::UsernameTaken { .. } | Error::Validation { .. })) => {
                reply_private(ctx, format!("❌ {e}")).await
            }
            Err(e) => Err(e),
        }
    }

    /// Ends the current session.
    #[poise::command(slash_command, prefix_command)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = caller_id(ctx);
        ctx.data().ledger.lock().await.logout(&caller).await?;
        reply_private(ctx, "👋 Logged out.".to_string()).await
    }

    /// Shows who you are logged in as.
    #[poise::command(slash_command, prefix_command)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = caller_id(ctx);
        let session = ctx.data().ledger.lock().await.session(&caller).await?;

        let text = session.user(Utc::now()).map_or_else(
            || "You are not logged in.".to_string(),
            |user| format!("Logged in as **{}** ({}).", user.username, user.role.as_str()),
        );
        reply_private(ctx, text).await
    }
}

pub use inner::*;
