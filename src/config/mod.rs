//! Configuration module for the ad rewards bot.
//!
//! Handles loading and validation of the bot settings, the Telegram
//! token and the ad catalog.

mod ads;
mod settings;

pub use ads::{AdCatalog, AdCatalogError};
pub use settings::{
    parse_rollover_time, parse_threshold, BotSettings, ConfigError, ResetPolicy, TelegramConfig,
};

/// Click count at which a user qualifies for the giveaway and credits their referrer.
pub const DEFAULT_QUALIFICATION_THRESHOLD: u32 = 20;
