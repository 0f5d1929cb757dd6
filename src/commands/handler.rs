//! Interaction handler implementation.

use std::sync::Arc;

use teloxide::utils::html;
use tracing::{debug, info};

use super::types::{CommandResult, MenuAction, StartCommand};
use crate::config::AdCatalog;
use crate::ledger::{LedgerStore, Result};

/// Handles `/start` and menu buttons against the ledger.
///
/// Takes the caller's id and returns the reply as Telegram HTML. Every
/// inserted value goes through [`html::escape`].
pub struct InteractionHandler {
    /// Shared ledger.
    ledger: Arc<LedgerStore>,

    /// Ads shown by the view-ad button.
    ads: AdCatalog,

    /// Clicks that qualify a user and credit their referrer.
    threshold: u32,

    /// Bot username used in referral deep links.
    bot_username: String,
}

impl InteractionHandler {
    /// Creates a new interaction handler.
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        ads: AdCatalog,
        threshold: u32,
        bot_username: String,
    ) -> Self {
        Self {
            ledger,
            ads,
            threshold,
            bot_username,
        }
    }

    /// Registers the caller (with a referrer taken from the payload) and
    /// returns the welcome message.
    pub async fn handle_start(&self, user_id: i64, command: &StartCommand) -> Result<CommandResult> {
        let referred_by = command.referrer(user_id);
        if command.payload.is_some() && referred_by.is_none() {
            debug!("Ignoring start payload {:?} from {}", command.payload, user_id);
        }

        if self.ledger.register_user(user_id, referred_by).await? {
            info!("New user {} (referred_by: {:?})", user_id, referred_by);
        }

        Ok(CommandResult::success(format!(
            "👋 <b>Welcome!</b>\n\n\
             Click ads below to earn points.\n\
             {} clicks qualify you for the giveaway.\n",
            self.threshold
        )))
    }

    /// Handles raw callback data from a menu button.
    pub async fn handle_callback(&self, user_id: i64, data: &str) -> Result<CommandResult> {
        match MenuAction::parse(data) {
            Some(action) => self.handle_action(user_id, action).await,
            None => {
                debug!("Unknown callback data {:?} from {}", data, user_id);
                Ok(CommandResult::error(
                    "🤔 Unknown action. Please use the menu below.",
                ))
            }
        }
    }

    /// Executes a menu action.
    pub async fn handle_action(&self, user_id: i64, action: MenuAction) -> Result<CommandResult> {
        debug!("Handling {} for {}", action, user_id);

        // Button taps can come from users the ledger has never seen.
        if self.ledger.register_user(user_id, None).await? {
            info!("Registered {} on first button tap", user_id);
        }

        match action {
            MenuAction::ViewAd => self.handle_view_ad(user_id).await,
            MenuAction::RefLink => Ok(self.handle_ref_link(user_id)),
            MenuAction::Stats => self.handle_stats(user_id).await,
        }
    }

    async fn handle_view_ad(&self, user_id: i64) -> Result<CommandResult> {
        let Some(ad_url) = self.ads.select(user_id) else {
            return Ok(CommandResult::error("📭 No ads available right now."));
        };

        let view = self.ledger.record_ad_view(user_id, self.threshold).await?;
        if let Some(referrer) = view.credited_referrer {
            info!("User {} qualified, credited referral to {}", user_id, referrer);
        }

        Ok(CommandResult::success(format!(
            "🎯 <b>Ad Clicked!</b>\n\n\
             You now have <b>{} clicks</b>.\n\n\
             🔗 Ad: {}",
            view.clicks,
            html::escape(ad_url)
        )))
    }

    fn handle_ref_link(&self, user_id: i64) -> CommandResult {
        CommandResult::success(format!(
            "👥 <b>Your Referral Link:</b>\n{}",
            html::escape(&self.referral_link(user_id))
        ))
    }

    async fn handle_stats(&self, user_id: i64) -> Result<CommandResult> {
        let stats = self.ledger.get_stats(user_id).await?.unwrap_or_default();

        Ok(CommandResult::success(format!(
            "📊 <b>Your Stats</b>\n\n\
             Clicks: <b>{}</b>\n\
             Qualified Referrals: <b>{}</b>",
            stats.clicks, stats.referrals
        )))
    }

    /// Deep link that starts the bot with `user_id` as the payload.
    #[must_use]
    pub fn referral_link(&self, user_id: i64) -> String {
        format!("https://t.me/{}?start={}", self.bot_username, user_id)
    }
}

impl std::fmt::Debug for InteractionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionHandler")
            .field("ads", &self.ads.len())
            .field("threshold", &self.threshold)
            .field("bot_username", &self.bot_username)
            .finish_non_exhaustive()
    }
}
