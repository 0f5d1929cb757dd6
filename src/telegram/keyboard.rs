//! Inline menu shown under every reply.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::commands::MenuAction;

/// The fixed three-button menu: view ad, referral link, stats.
#[must_use]
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(MenuAction::ALL.iter().map(|action| {
        vec![InlineKeyboardButton::callback(
            action.label(),
            action.callback_data(),
        )]
    }))
}
