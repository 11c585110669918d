//! Payment scanner - reads a bank notification and credits the matched employee.
//!
//! The ledger lock is released while the matcher runs, and only one scan may
//! be in flight at a time.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{ADMIN_REQUIRED, BotData, caller_id},
        core::{
            matcher::{PaymentMatch, PaymentMatcher},
            report,
        },
        errors::{Error, Result},
    };

    fn describe_match(found: &PaymentMatch, name: Option<&str>) -> String {
        let amount = found
            .credit_amount()
            .map_or_else(|| format!("{}", found.amount), report::format_vnd);
        let who = name.unwrap_or("no employee");
        if found.confidence.is_empty() {
            format!("🔎 Found {amount} from **{who}**.")
        } else {
            format!("🔎 Found {amount} from **{who}** ({}).", found.confidence)
        }
    }

    /// Matches a bank notification to an employee and optionally credits them.
    #[poise::command(slash_command, prefix_command)]
    pub async fn scan(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Pasted bank notification or transfer message"] text: String,
        #[description = "Credit the matched employee right away"] confirm: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(matcher) = data.matcher.as_ref() else {
            ctx.say("❌ The payment scanner is not configured (missing GEMINI_API_KEY).")
                .await?;
            return Ok(());
        };
        if text.trim().is_empty() {
            ctx.say("❌ Paste the notification text to scan.").await?;
            return Ok(());
        }
        let Some(_guard) = data.begin_scan() else {
            ctx.say("⏳ A scan is already running, try again in a moment.")
                .await?;
            return Ok(());
        };

        ctx.defer().await?;

        let caller = caller_id(ctx);
        let (session, candidates) = {
            let ledger = data.ledger.lock().await;
            let session = ledger.session(&caller).await?;
            let candidates = ledger.payment_candidates(&session);
            (session, candidates)
        };
        let Some(candidates) = candidates else {
            ctx.say(ADMIN_REQUIRED).await?;
            return Ok(());
        };
        if candidates.is_empty() {
            ctx.say("No employees to match against.").await?;
            return Ok(());
        }

        let found = match matcher.match_payment(&text, &candidates).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Payment scan failed: {e}");
                ctx.say(format!("❌ Could not read the notification: {e}"))
                    .await?;
                return Ok(());
            }
        };

        let matched_name = found.matched_employee_id.as_deref().and_then(|id| {
            candidates
                .iter()
                .find(|candidate| candidate.id == id)
                .map(|candidate| candidate.name.as_str())
        });
        let summary = describe_match(&found, matched_name);

        if !confirm.unwrap_or(false) {
            ctx.say(format!(
                "{summary}\nRun again with `confirm: True` to credit this payment."
            ))
            .await?;
            return Ok(());
        }

        let mut ledger = data.ledger.lock().await;
        match ledger.confirm_payment(&session, &found).await {
            Ok(Some(payment)) => {
                ctx.say(format!(
                    "{summary}\n💰 Credited {} to **{}**, balance {}.",
                    report::format_vnd(payment.amount),
                    payment.employee.name,
                    report::format_balance(payment.employee.balance)
                ))
                .await?;
            }
            Ok(None) => {
                ctx.say(format!("{summary}\nNothing was credited.")).await?;
            }
            Err(e @ (Error::Matcher { .. } | Error::InvalidAmount { .. })) => {
                ctx.say(format!("{summary}\n❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

pub use inner::*;
