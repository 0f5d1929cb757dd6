//! Telegram transport module.
//!
//! Wires the Bot API (via `teloxide`) to the interaction handler,
//! renders the inline menu, and delivers admin summaries.

mod dispatch;
mod error;
mod keyboard;
mod notifier;

pub use dispatch::{run_dispatcher, schema};
pub use error::TelegramError;
pub use keyboard::main_menu;
pub use notifier::AdminNotifier;
