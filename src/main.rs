//! Binary entry point: wires configuration, storage, the background
//! cleanup worker, and the Discord client together.

use haze_visuals_bot::{background, bot, config, errors::Result, storage::JsonStore};

use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!(data_dir = %app_config.data_dir.display(), "Configuration loaded.");

    // 4. Open the JSON document store
    let store = Arc::new(
        JsonStore::new(&app_config.data_dir)
            .inspect(|_| info!("Document store initialized."))
            .inspect_err(|e| error!("Failed to initialize document store: {e}"))?,
    );

    // 5. Start the cleanup worker
    tokio::spawn(background::run_cleanup_worker(
        Arc::clone(&store),
        app_config.cleanup_interval_hours,
    ));

    // 6. Run the bot. The token is read directly before use, not stored in AppConfig.
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))?;

    bot::run_bot(token, store).await?;

    Ok(())
}
