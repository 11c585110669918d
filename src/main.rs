#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use lunch_buddy::{
    bot::{self, BotData},
    config::{self, app, database},
    core::{ledger::Ledger, matcher::GeminiMatcher},
    db::{KvStore, Persistence},
    errors::{Error, Result},
};
use std::{env, path::Path};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Connects the remote mirror, or returns `None` so the ledger runs local-only.
async fn connect_remote() -> Option<KvStore> {
    let url = database::get_remote_database_url()?;
    match database::create_connection(&url).await {
        Ok(db) => {
            info!("Remote mirror connected.");
            Some(KvStore::new(db, "remote"))
        }
        Err(e) => {
            warn!("Remote mirror unavailable, continuing local-only: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Open the local store and the optional remote mirror
    let database_url = database::get_database_url();
    ensure_sqlite_dir(&database_url)?;
    let local = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Local database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    let local = KvStore::new(local, "local");
    let persistence = match connect_remote().await {
        Some(remote) => Persistence::with_remote(local, remote),
        None => Persistence::local_only(local),
    };

    // 5. Load every collection, seeding the admin account on first run
    let matcher = app::matcher_api_key().map(|key| GeminiMatcher::new(key, &app_config.matcher));
    if matcher.is_none() {
        warn!("GEMINI_API_KEY not set, the payment scanner is disabled.");
    }
    let ledger = Ledger::load(persistence, app_config, &app::admin_password())
        .await
        .inspect(|_| info!("Ledger loaded."))
        .inspect_err(|e| error!("Failed to load ledger: {}", e))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(ledger, matcher)).await
}
