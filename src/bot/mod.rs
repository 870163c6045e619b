//! Bot layer - Discord-specific interface and command handlers.
//!
//! This module provides the Discord interface for the Haze Visuals commerce
//! bot: the slash commands for appointment booking and discount redemption,
//! the autocomplete handlers, and the shared bot context.

/// Discord command implementations (appointments, discounts, general)
pub mod commands;
/// Discord interaction handlers (autocomplete)
pub mod handlers;

use crate::{errors::Error, storage::JsonStore};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

/// Shared data available to all bot commands.
pub struct BotData {
    /// JSON document store for appointments and discount codes
    pub store: Arc<JsonStore>,
}

impl BotData {
    /// Creates a new `BotData` instance sharing the given store.
    #[must_use]
    pub const fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

/// Context alias used by every command in this crate.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {error:?}", ctx.command().name);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework, registers the slash commands globally, and
/// runs the Discord client until it disconnects.
pub async fn run_bot(
    token: String,
    store: Arc<JsonStore>,
) -> std::result::Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::appointment::slots(),
                commands::appointment::book(),
                commands::appointment::appointments(),
                commands::appointment::cancel_appointments(),
                commands::appointment::clear_appointments(),
                commands::discount::redeem(),
                commands::discount::discounts(),
                commands::discount::discount_add(),
                commands::discount::discount_remove(),
                commands::discount::discount_reset(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(store))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await
}
