//! Ad Rewards Bot - Main Entry Point
//!
//! A Telegram bot that rewards users for viewing ads, tracks referrals,
//! and sends the admin a daily click summary before resetting counters.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ad_rewards_bot::commands::InteractionHandler;
use ad_rewards_bot::config::{AdCatalog, BotSettings, TelegramConfig};
use ad_rewards_bot::ledger::LedgerStore;
use ad_rewards_bot::rollover::{RolloverMessage, RolloverTimer};
use ad_rewards_bot::telegram::{run_dispatcher, AdminNotifier, TelegramError};

/// Telegram bot that rewards ad views and referrals.
#[derive(Parser, Debug)]
#[command(name = "ad_rewards_bot")]
#[command(about = "Reward users for viewing ads and report daily to an admin")]
#[command(version)]
struct Args {
    /// Path to the ad catalog JSON file (overrides `ADS_PATH`).
    #[arg(short, long)]
    ads: Option<PathBuf>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example ad catalog file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let mut settings =
        BotSettings::from_env().context("Failed to load bot settings from environment")?;
    if let Some(path) = args.ads {
        settings.ads_path = path;
    }

    let ads = AdCatalog::load_from_file(&settings.ads_path).with_context(|| {
        format!("Failed to load ad catalog from {}", settings.ads_path.display())
    })?;
    ads.validate().context("Ad catalog validation failed")?;

    info!(
        "Loaded {} ads (threshold: {}, rollover at {}, reset policy: {})",
        ads.len(),
        settings.qualification_threshold,
        settings.rollover_time,
        settings.reset_policy
    );

    let ledger = Arc::new(
        LedgerStore::open(&settings.ledger_path).context("Failed to open the ledger database")?,
    );
    info!("Ledger holds {} users", ledger.user_count().await?);

    // Connect to Telegram
    let bot = Bot::new(tg_config.token);
    let me = bot.get_me().await.context("Failed to reach Telegram")?;
    let username = me
        .user
        .username
        .clone()
        .ok_or(TelegramError::MissingUsername)?;
    info!("Authorized as @{}", username);

    let handler = Arc::new(InteractionHandler::new(
        Arc::clone(&ledger),
        ads,
        settings.qualification_threshold,
        username,
    ));

    let notifier = AdminNotifier::new(bot.clone(), ChatId(settings.admin_id));
    let timer = RolloverTimer::new(Arc::clone(&ledger), notifier, &settings);

    // Create rollover channel
    let (rollover_tx, rollover_rx) = mpsc::channel::<RolloverMessage>(4);

    let rollover_handle = tokio::spawn(async move {
        timer.run(rollover_rx).await;
    });

    info!("Bot is running. Use Ctrl+C to stop.");
    run_dispatcher(bot, handler).await;

    // Cleanup
    info!("Shutting down...");
    let _ = rollover_tx.send(RolloverMessage::Shutdown).await;
    let _ = rollover_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example ad catalog file.
fn generate_example_config() -> Result<()> {
    let example = AdCatalog::example();
    example.save_to_file("ads.example.json")?;

    println!("✓ Example ad catalog written to: ads.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy ads.example.json to ads.json and put your ad links in it");
    println!("2. Create a .env file with TELEGRAM_TOKEN and ADMIN_ID");
    println!("3. Run: ad_rewards_bot");

    Ok(())
}
