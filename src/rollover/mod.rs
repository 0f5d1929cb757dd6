//! Daily rollover timer.
//!
//! Once a day, shortly after local midnight, sends the admin a summary
//! of every user's clicks and resets the per-day counters.

mod runner;
mod schedule;
mod summary;

pub use runner::{RolloverMessage, RolloverOutcome, RolloverTimer, SummaryNotifier};
pub use schedule::{is_due, next_trigger, until};
pub use summary::{format_summary, split_message, TELEGRAM_MESSAGE_LIMIT};
