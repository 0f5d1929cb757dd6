//! Rollover timer runner.
//!
//! One state, waiting. Each cycle:
//! 1. Compute tomorrow's trigger instant from the current local time
//! 2. Sleep until then (or stop on `Shutdown`)
//! 3. Build the summary and deliver it to the admin
//! 4. Reset all click counters according to the [`ResetPolicy`]
//!
//! Delivery and ledger failures are logged and never end the loop.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveTime};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::schedule::{is_due, next_trigger, until};
use super::summary::{format_summary, split_message, TELEGRAM_MESSAGE_LIMIT};
use crate::config::{BotSettings, ResetPolicy};
use crate::ledger::LedgerStore;
use crate::telegram::TelegramError;

/// Messages that can be sent to the rollover timer.
#[derive(Debug, Clone)]
pub enum RolloverMessage {
    /// Stop the timer.
    Shutdown,
}

/// Delivers the daily summary to the admin.
pub trait SummaryNotifier: Send + Sync {
    /// Sends one message of the summary.
    fn deliver(&self, text: &str) -> impl Future<Output = Result<(), TelegramError>> + Send;
}

/// What a single rollover did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// Whether every part of the summary reached the admin.
    pub delivered: bool,
    /// Rows reset, `None` when the reset was skipped or failed.
    pub reset_rows: Option<usize>,
}

/// Daily summary-and-reset timer.
pub struct RolloverTimer<N> {
    /// Shared ledger.
    ledger: Arc<LedgerStore>,

    /// Summary recipient.
    notifier: N,

    /// Local time of day to fire at.
    rollover_time: NaiveTime,

    /// Clicks needed to count as qualified in the summary footer.
    threshold: u32,

    /// Reset behavior after a failed delivery.
    policy: ResetPolicy,
}

impl<N: SummaryNotifier> RolloverTimer<N> {
    /// Creates a new rollover timer.
    #[must_use]
    pub fn new(ledger: Arc<LedgerStore>, notifier: N, settings: &BotSettings) -> Self {
        Self {
            ledger,
            notifier,
            rollover_time: settings.rollover_time,
            threshold: settings.qualification_threshold,
            policy: settings.reset_policy,
        }
    }

    /// Runs the timer loop until `Shutdown` arrives or the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<RolloverMessage>) {
        info!(
            "Rollover timer started (time: {}, policy: {})",
            self.rollover_time, self.policy
        );

        loop {
            let next = next_trigger(&Local::now(), self.rollover_time);
            info!("Next rollover at {}", next.format("%Y-%m-%d %H:%M:%S"));

            // The sleep runs on the monotonic clock; a wall clock stepped
            // backwards wakes us before `next`, so wait again for the rest.
            loop {
                let now = Local::now();
                if is_due(&now, &next) {
                    break;
                }
                let wait = until(&now, &next);
                debug!("Rollover due in {}s", wait.as_secs());

                tokio::select! {
                    () = tokio::time::sleep(wait) => {}
                    msg = rx.recv() => {
                        match msg {
                            Some(RolloverMessage::Shutdown) | None => {
                                info!("Rollover timer shutting down");
                                return;
                            }
                        }
                    }
                }
            }

            self.run_cycle().await;
        }
    }

    /// Performs one rollover: summary, delivery, reset.
    pub async fn run_cycle(&self) -> RolloverOutcome {
        info!("Running daily rollover");

        let delivered = match self.build_summary().await {
            Ok(summary) => self.deliver(&summary).await,
            Err(e) => {
                error!("Failed to build daily summary: {}", e);
                false
            }
        };

        if !delivered && self.policy == ResetPolicy::AfterDelivery {
            warn!("Summary not delivered, keeping click counters until the next rollover");
            return RolloverOutcome {
                delivered,
                reset_rows: None,
            };
        }

        let reset_rows = match self.ledger.reset_all_clicks().await {
            Ok(rows) => {
                info!("Reset click counters for {} users", rows);
                Some(rows)
            }
            Err(e) => {
                error!("Failed to reset click counters: {}", e);
                None
            }
        };

        RolloverOutcome {
            delivered,
            reset_rows,
        }
    }

    async fn build_summary(&self) -> crate::ledger::Result<String> {
        let rows = self.ledger.summarize().await?;
        let qualified = self.ledger.list_qualified(self.threshold).await?;
        debug!("Summary covers {} users, {} qualified", rows.len(), qualified.len());
        Ok(format_summary(&rows, &qualified, self.threshold))
    }

    /// Sends the summary in as many messages as needed. Stops at the first failure.
    async fn deliver(&self, summary: &str) -> bool {
        let chunks = split_message(summary, TELEGRAM_MESSAGE_LIMIT);
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            match self.notifier.deliver(chunk).await {
                Ok(()) => debug!("Delivered summary part {}/{}", i + 1, total),
                Err(TelegramError::FloodWait(seconds)) => {
                    error!("Summary delivery hit flood control ({} seconds)", seconds);
                    return false;
                }
                Err(e) => {
                    error!("Failed to deliver summary part {}/{}: {}", i + 1, total, e);
                    return false;
                }
            }
        }

        info!("Daily summary delivered ({} message(s))", total);
        true
    }

    /// Gets a reference to the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<N> std::fmt::Debug for RolloverTimer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RolloverTimer")
            .field("rollover_time", &self.rollover_time)
            .field("threshold", &self.threshold)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
