//! Row types returned by the ledger.

use serde::{Deserialize, Serialize};

/// One row of the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Telegram user id.
    pub user_id: i64,
    /// Ad views in the current day window.
    pub clicks: u32,
    /// Referred users that reached the qualification threshold.
    pub referrals: u32,
    /// Who referred this user, fixed at registration.
    pub referred_by: Option<i64>,
}

/// Per-user numbers shown by the stats button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub clicks: u32,
    pub referrals: u32,
}

/// A `(user_id, clicks)` line of the daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickSummary {
    pub user_id: i64,
    pub clicks: u32,
}

/// Outcome of a single ad view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdView {
    /// Click count after this view.
    pub clicks: u32,
    /// Referrer credited by this view, if it was the qualifying one.
    pub credited_referrer: Option<i64>,
}
