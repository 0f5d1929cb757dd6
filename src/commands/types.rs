//! Command and callback types.

use std::fmt;

/// The `/start` command with its optional deep-link payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCommand {
    /// Raw argument after `/start`, if any.
    pub payload: Option<String>,
}

impl StartCommand {
    /// Parses `/start`, `/start <payload>` or `/start@botname <payload>`.
    ///
    /// Returns `None` if the message is not a start command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let command = parts.next()?;

        let name = command.split_once('@').map_or(command, |(name, _bot)| name);
        if !name.eq_ignore_ascii_case("/start") {
            return None;
        }

        Some(Self {
            payload: parts.next().map(str::to_owned),
        })
    }

    /// Referrer id carried by the payload.
    ///
    /// Non-numeric payloads and the caller's own id yield `None`.
    #[must_use]
    pub fn referrer(&self, caller_id: i64) -> Option<i64> {
        self.payload
            .as_deref()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|&id| id != caller_id)
    }
}

/// Inline menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Show an ad and count the click.
    ViewAd,
    /// Show the caller's referral deep link.
    RefLink,
    /// Show the caller's clicks and referrals.
    Stats,
}

impl MenuAction {
    /// Every button, in menu order.
    pub const ALL: [Self; 3] = [Self::ViewAd, Self::RefLink, Self::Stats];

    /// Parses callback data.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        match data.trim() {
            "view_ad" => Some(Self::ViewAd),
            "ref_link" => Some(Self::RefLink),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }

    /// Callback data carried by the button.
    #[must_use]
    pub const fn callback_data(&self) -> &'static str {
        match self {
            Self::ViewAd => "view_ad",
            Self::RefLink => "ref_link",
            Self::Stats => "stats",
        }
    }

    /// Button label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ViewAd => "📢 View Ad",
            Self::RefLink => "👥 Referral Link",
            Self::Stats => "📊 My Stats",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callback_data())
    }
}

/// Result of handling an interaction.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the interaction was handled normally.
    pub success: bool,

    /// HTML reply shown to the user above the menu.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Generic reply used when handling failed unexpectedly.
    #[must_use]
    pub fn failure() -> Self {
        Self::error("⚠️ Something went wrong. Please try again.")
    }
}
