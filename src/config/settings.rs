//! Application settings and Telegram configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::DEFAULT_QUALIFICATION_THRESHOLD;

/// Telegram Bot API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token (obtain from @BotFather).
    pub token: String,
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self { token }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_TOKEN` to be set and non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("TELEGRAM_TOKEN")
            .ok()
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingEnvVar("TELEGRAM_TOKEN"))?;

        Ok(Self { token })
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// What the rollover does with the counters when the admin summary
/// could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Reset the counters regardless of the delivery outcome.
    #[default]
    Always,
    /// Keep the counters when delivery failed; they carry over to the next cycle.
    AfterDelivery,
}

impl FromStr for ResetPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "after-delivery" | "after_delivery" | "on-delivery" => Ok(Self::AfterDelivery),
            other => Err(ConfigError::InvalidResetPolicy(other.to_owned())),
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::AfterDelivery => write!(f, "after-delivery"),
        }
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Chat id that receives the daily summary.
    pub admin_id: i64,

    /// Path to the SQLite ledger file.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Path to the ad catalog JSON file.
    #[serde(default = "default_ads_path")]
    pub ads_path: PathBuf,

    /// Click count that qualifies a user and credits their referrer.
    #[serde(default = "default_threshold")]
    pub qualification_threshold: u32,

    /// Local time of day at which the rollover runs.
    #[serde(default = "default_rollover_time")]
    pub rollover_time: NaiveTime,

    /// Whether a failed summary delivery still resets the counters.
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("bot.db")
}

fn default_ads_path() -> PathBuf {
    PathBuf::from("ads.json")
}

const fn default_threshold() -> u32 {
    DEFAULT_QUALIFICATION_THRESHOLD
}

fn default_rollover_time() -> NaiveTime {
    // 00:00:05 always exists
    NaiveTime::from_hms_opt(0, 0, 5).unwrap_or_default()
}

impl BotSettings {
    /// Creates settings for the given admin with every other value defaulted.
    #[must_use]
    pub fn new(admin_id: i64) -> Self {
        Self {
            admin_id,
            ledger_path: default_ledger_path(),
            ads_path: default_ads_path(),
            qualification_threshold: default_threshold(),
            rollover_time: default_rollover_time(),
            reset_policy: ResetPolicy::default(),
        }
    }

    /// Creates bot settings from environment variables.
    ///
    /// `ADMIN_ID` is required; `LEDGER_PATH`, `ADS_PATH`,
    /// `QUALIFICATION_THRESHOLD`, `ROLLOVER_TIME` and `RESET_POLICY`
    /// fall back to defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_id = std::env::var("ADMIN_ID")
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_ID"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAdminId)?;

        let mut settings = Self::new(admin_id);

        if let Ok(path) = std::env::var("LEDGER_PATH") {
            settings.ledger_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("ADS_PATH") {
            settings.ads_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("QUALIFICATION_THRESHOLD") {
            settings.qualification_threshold = parse_threshold(&raw)?;
        }
        if let Ok(raw) = std::env::var("ROLLOVER_TIME") {
            settings.rollover_time = parse_rollover_time(&raw)?;
        }
        if let Ok(raw) = std::env::var("RESET_POLICY") {
            settings.reset_policy = raw.parse()?;
        }

        Ok(settings)
    }
}

/// Parses a qualification threshold (must be at least 1).
pub fn parse_threshold(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| ConfigError::InvalidThreshold(raw.to_owned()))
}

/// Parses a rollover time in `HH:MM:SS` or `HH:MM` form.
pub fn parse_rollover_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ConfigError::InvalidRolloverTime(raw.to_owned()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid admin id format (must be an integer chat id)")]
    InvalidAdminId,

    #[error("Invalid qualification threshold '{0}' (must be a positive integer)")]
    InvalidThreshold(String),

    #[error("Invalid rollover time '{0}' (expected HH:MM:SS)")]
    InvalidRolloverTime(String),

    #[error("Invalid reset policy '{0}' (expected 'always' or 'after-delivery')")]
    InvalidResetPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::new(42);
        assert_eq!(settings.admin_id, 42);
        assert_eq!(settings.ledger_path, PathBuf::from("bot.db"));
        assert_eq!(settings.ads_path, PathBuf::from("ads.json"));
        assert_eq!(settings.qualification_threshold, 20);
        assert_eq!(
            settings.rollover_time,
            NaiveTime::from_hms_opt(0, 0, 5).unwrap()
        );
        assert_eq!(settings.reset_policy, ResetPolicy::Always);
    }

    #[test]
    fn test_telegram_config_debug_hides_token() {
        let config = TelegramConfig::new("123:secret".to_owned());
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_parse_reset_policy() {
        assert_eq!("always".parse::<ResetPolicy>().unwrap(), ResetPolicy::Always);
        assert_eq!(
            "After-Delivery".parse::<ResetPolicy>().unwrap(),
            ResetPolicy::AfterDelivery
        );
        assert!("sometimes".parse::<ResetPolicy>().is_err());
    }

    #[test]
    fn test_parse_rollover_time() {
        assert_eq!(
            parse_rollover_time("03:30").unwrap(),
            NaiveTime::from_hms_opt(3, 30, 0).unwrap()
        );
        assert_eq!(
            parse_rollover_time(" 00:00:05 ").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 5).unwrap()
        );
        assert!(parse_rollover_time("25:00").is_err());
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("20").unwrap(), 20);
        assert!(parse_threshold("0").is_err());
        assert!(parse_threshold("-3").is_err());
        assert!(parse_threshold("many").is_err());
    }
}
