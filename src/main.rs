// This is the entry point of the image censor bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (HTTP clients)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load and validate configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::censor::{
    CensorConfig, CensorPlugin, CensorService, RenderRegistry, UNSAFE_IMAGE_KEY,
};
use crate::core::i18n::StringTable;
use crate::discord::censor::message_handler;
use crate::discord::{Data, Error};
use crate::infra::censor::{HttpImageFetcher, SafetyCheckerClient};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "data/censor.json";

/// Event handler for non-command Discord events.
/// This is where incoming messages get censored.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        if let Err(e) =
            message_handler::handle_incoming(ctx, new_message, &data.censor, &data.i18n).await
        {
            // Censoring problems must never take down the event loop.
            tracing::error!("Error censoring incoming message: {}", e);
        }
    }

    Ok(())
}

/// Read and validate the censor configuration.
///
/// Any problem here - unreadable file, bad JSON, out-of-range thresholds,
/// missing endpoint - aborts activation. Configuration errors are never
/// allowed to surface per-image at runtime.
fn load_config(path: &Path) -> anyhow::Result<CensorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read censor config at {}", path.display()))?;

    let config: CensorConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse censor config at {}", path.display()))?;

    config.validate().context("invalid censor configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    let config_path =
        std::env::var("IMAGE_CENSOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config =
        load_config(Path::new(&config_path)).expect("Failed to load censor configuration");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let fetcher = HttpImageFetcher::new();
    let classifier = SafetyCheckerClient::new(config.endpoint.clone());
    let censor_service = Arc::new(CensorService::new(fetcher, classifier, config.clone()));

    let registry = Arc::new(RenderRegistry::new());
    let plugin = Arc::new(CensorPlugin::new(
        Arc::clone(&censor_service),
        registry,
        config.clone(),
    ));

    // Warning texts. The zh-CN entry is the canonical one; more locales can
    // be defined the same way.
    let i18n = Arc::new(StringTable::new("zh-CN"));
    i18n.define("zh-CN", [(UNSAFE_IMAGE_KEY, "不可以涩涩！")]);
    i18n.define("en-US", [(UNSAFE_IMAGE_KEY, "NSFW content blocked.")]);

    // Install the render hook and arm the configured message hooks.
    plugin.start();

    // Create the data structure that will be shared across all commands
    let data = Data {
        censor: Arc::clone(&plugin),
        i18n: Arc::clone(&i18n),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to see attachments and embeds
        | serenity::GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![discord::commands::censor::censor()],
            // Event handler for messages and other events
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered, bot is ready");
                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    let result = client.start().await;

    // Tear the censor hooks down before reporting how the gateway loop ended.
    // Evaluations still in flight finish on their own.
    plugin.stop();

    if let Err(e) = result {
        tracing::error!("Bot stopped with error: {}", e);
    }
}

// ============================================================================
// TESTS
// ============================================================================
