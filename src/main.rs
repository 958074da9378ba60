// This is the entry point of the utility bot.
//
// **Architecture Overview:**
// - `core/` = Command table and services (platform-agnostic)
// - `infra/` = Implementations of core traits (HTTP clients, SQLite)
// - `discord/` = Discord-specific adapters (message dispatch, slash commands)
//
// This file's job is to:
// 1. Load configuration
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

mod config;

use crate::config::BotConfig;
use crate::core::history::HistoryService;
use crate::core::lookups::LookupService;
use crate::core::media::{MediaConfig, MediaService};
use crate::core::utilities::{utility_commands, Utilities};
use crate::discord::{Data, Error};
use crate::infra::history::SqliteMessageStore;
use crate::infra::http::{GoogleScraper, HttpLookupClient, HttpMediaFetcher};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!(
                user = %data_about_bot.user.name,
                guilds = data_about_bot.guilds.len(),
                "Connected to Discord"
            );
        }
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = discord::dispatch::handle_message(ctx, data, new_message).await {
                tracing::error!(message_id = new_message.id.get(), "Error handling message: {}", e);
            }
        }
        _ => {}
    }

    Ok(())
}

async fn build_utilities(config: &BotConfig) -> anyhow::Result<Utilities> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

    let history_path = config.history_db_path();
    let history_path = history_path
        .to_str()
        .context("history database path is not valid UTF-8")?;
    let message_store = SqliteMessageStore::new(history_path)
        .await
        .context("opening message history database")?;

    let lookup_client = HttpLookupClient::new(
        config.http_timeout,
        config.endpoints.clone(),
        config.hibp_api_key.clone(),
    )?;
    let scraper = GoogleScraper::new(config.http_timeout, config.search_url.clone())?;
    let fetcher = HttpMediaFetcher::new()?;

    Ok(Utilities {
        lookups: LookupService::new(Arc::new(lookup_client), Arc::new(scraper)),
        media: MediaService::new(
            Arc::new(fetcher),
            MediaConfig {
                cdn: config.emoji_cdn.clone(),
                default_timeout: config.http_timeout,
                user_url_timeout: config.user_url_timeout,
            },
        ),
        history: HistoryService::new(Arc::new(message_store)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()
        .context("Create a .env file with at least DISCORD_TOKEN set")?;

    let utilities = Arc::new(build_utilities(&config).await?);
    let commands = Arc::new(utility_commands());
    tracing::info!(
        commands = commands.entries().count(),
        prefix = %config.prefix,
        "Utility commands loaded"
    );

    let data = Data {
        commands,
        utilities,
        prefix: config.prefix.clone(),
    };

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read prefix commands
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::help::help()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Slash commands registered");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("building Discord client")?;

    client.start().await.context("Discord client stopped")?;
    Ok(())
}
