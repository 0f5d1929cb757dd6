//! Admin notifier backed by the Bot API.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::debug;

use super::TelegramError;
use crate::rollover::SummaryNotifier;

/// Sends rollover summaries to a fixed admin chat.
#[derive(Debug, Clone)]
pub struct AdminNotifier {
    bot: Bot,
    admin: ChatId,
}

impl AdminNotifier {
    /// Creates a notifier for the given admin chat.
    #[must_use]
    pub fn new(bot: Bot, admin: ChatId) -> Self {
        Self { bot, admin }
    }
}

impl SummaryNotifier for AdminNotifier {
    async fn deliver(&self, text: &str) -> Result<(), TelegramError> {
        debug!("Sending {} chars to admin {}", text.chars().count(), self.admin);
        self.bot
            .send_message(self.admin, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
