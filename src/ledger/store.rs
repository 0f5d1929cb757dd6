//! SQLite-backed ledger store.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{AdView, ClickSummary, LedgerError, Result, Stats};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        clicks INTEGER DEFAULT 0,
        referrals INTEGER DEFAULT 0,
        referred_by INTEGER
    )
";

/// Durable table of per-user counters.
///
/// All access goes through one connection behind an async mutex.
pub struct LedgerStore {
    conn: Mutex<Connection>,
}

impl LedgerStore {
    /// Opens (or creates) the ledger database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening ledger at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a throwaway in-memory ledger.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates the user if absent. Returns `true` when a row was created.
    ///
    /// A referrer equal to the user's own id is discarded. An existing
    /// user keeps its original referrer.
    pub async fn register_user(&self, user_id: i64, referred_by: Option<i64>) -> Result<bool> {
        let referred_by = referred_by.filter(|&r| r != user_id);
        let conn = self.conn.lock().await;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (user_id, clicks, referrals, referred_by)
             VALUES (?1, 0, 0, ?2)",
            params![user_id, referred_by],
        )?;

        if inserted == 1 {
            debug!("Registered user {user_id} (referred_by: {referred_by:?})");
        }
        Ok(inserted == 1)
    }

    /// Adds one click and returns the new count.
    pub async fn record_click(&self, user_id: i64) -> Result<u32> {
        let conn = self.conn.lock().await;
        increment_clicks(&conn, user_id)
    }

    /// Current click count, 0 for unknown users.
    pub async fn get_clicks(&self, user_id: i64) -> Result<u32> {
        let conn = self.conn.lock().await;
        let clicks = conn
            .query_row(
                "SELECT clicks FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(clicks.unwrap_or(0))
    }

    /// Adds one qualified referral to `referrer_id`.
    pub async fn credit_referral(&self, referrer_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        increment_referrals(&conn, referrer_id)
    }

    /// Records an ad view and credits the referrer when this view brings
    /// the user to exactly `threshold` clicks.
    ///
    /// Runs as one transaction, so a rollover cannot slip in between the
    /// increment and the referral check.
    pub async fn record_ad_view(&self, user_id: i64, threshold: u32) -> Result<AdView> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let clicks = increment_clicks(&tx, user_id)?;
        let mut credited_referrer = None;

        if clicks == threshold
            && let Some(referrer) = fetch_referred_by(&tx, user_id)?.flatten()
        {
            match increment_referrals(&tx, referrer) {
                Ok(()) => credited_referrer = Some(referrer),
                Err(LedgerError::NotRegistered(_)) => {
                    warn!("User {user_id} qualified but referrer {referrer} is not registered");
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        Ok(AdView {
            clicks,
            credited_referrer,
        })
    }

    /// Zeroes every user's click count. Returns the number of rows touched.
    pub async fn reset_all_clicks(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        Ok(conn.execute("UPDATE users SET clicks = 0", [])?)
    }

    /// Ids of users with at least `threshold` clicks.
    pub async fn list_qualified(&self, threshold: u32) -> Result<Vec<i64>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT user_id FROM users WHERE clicks >= ?1 ORDER BY user_id")?;
        let ids = stmt
            .query_map(params![threshold], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Snapshot of every user's click count.
    pub async fn summarize(&self) -> Result<Vec<ClickSummary>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT user_id, clicks FROM users ORDER BY user_id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ClickSummary {
                    user_id: row.get(0)?,
                    clicks: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Referrer of `user_id`; `None` if unknown or self-registered.
    pub async fn get_referred_by(&self, user_id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        Ok(fetch_referred_by(&conn, user_id)?.flatten())
    }

    /// Clicks and referrals of `user_id`; `None` if not registered.
    pub async fn get_stats(&self, user_id: i64) -> Result<Option<Stats>> {
        let conn = self.conn.lock().await;
        let stats = conn
            .query_row(
                "SELECT clicks, referrals FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(Stats {
                        clicks: row.get(0)?,
                        referrals: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }

    /// Full row for `user_id`.
    #[cfg(test)]
    pub async fn get_account(&self, user_id: i64) -> Result<Option<super::UserAccount>> {
        let conn = self.conn.lock().await;
        let account = conn
            .query_row(
                "SELECT user_id, clicks, referrals, referred_by FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(super::UserAccount {
                        user_id: row.get(0)?,
                        clicks: row.get(1)?,
                        referrals: row.get(2)?,
                        referred_by: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(account)
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn increment_clicks(conn: &Connection, user_id: i64) -> Result<u32> {
    conn.query_row(
        "UPDATE users SET clicks = clicks + 1 WHERE user_id = ?1 RETURNING clicks",
        params![user_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(LedgerError::NotRegistered(user_id))
}

fn increment_referrals(conn: &Connection, referrer_id: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET referrals = referrals + 1 WHERE user_id = ?1",
        params![referrer_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::NotRegistered(referrer_id));
    }
    Ok(())
}

/// Outer `None`: unknown user. Inner `None`: registered without referrer.
fn fetch_referred_by(conn: &Connection, user_id: i64) -> Result<Option<Option<i64>>> {
    Ok(conn
        .query_row(
            "SELECT referred_by FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?)
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u32 = 20;

    fn store() -> LedgerStore {
        LedgerStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let ledger = store();
        assert!(ledger.register_user(1, Some(2)).await.unwrap());
        ledger.record_click(1).await.unwrap();
        ledger.credit_referral(1).await.unwrap();

        let before = ledger.get_account(1).await.unwrap();
        assert!(!ledger.register_user(1, Some(3)).await.unwrap());
        let after = ledger.get_account(1).await.unwrap();

        assert_eq!(before, after);
        assert_eq!(after.unwrap().referred_by, Some(2));
    }

    #[tokio::test]
    async fn test_self_referral_is_discarded() {
        let ledger = store();
        ledger.register_user(5, Some(5)).await.unwrap();
        assert_eq!(ledger.get_referred_by(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_click_count_matches_calls() {
        let ledger = store();
        ledger.register_user(1, None).await.unwrap();
        for expected in 1..=7 {
            assert_eq!(ledger.record_click(1).await.unwrap(), expected);
        }
        assert_eq!(ledger.get_clicks(1).await.unwrap(), 7);

        ledger.reset_all_clicks().await.unwrap();
        ledger.record_click(1).await.unwrap();
        assert_eq!(ledger.get_clicks(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let ledger = store();
        assert_eq!(ledger.get_clicks(404).await.unwrap(), 0);
        assert_eq!(ledger.get_stats(404).await.unwrap(), None);
        assert_eq!(ledger.get_referred_by(404).await.unwrap(), None);
        assert!(matches!(
            ledger.record_click(404).await,
            Err(LedgerError::NotRegistered(404))
        ));
        assert!(matches!(
            ledger.credit_referral(404).await,
            Err(LedgerError::NotRegistered(404))
        ));
        assert!(ledger.record_ad_view(404, THRESHOLD).await.unwrap_err().is_not_registered());
    }

    #[tokio::test]
    async fn test_registered_with_zero_differs_from_unknown() {
        let ledger = store();
        ledger.register_user(1, None).await.unwrap();
        assert_eq!(ledger.get_stats(1).await.unwrap(), Some(Stats::default()));
        assert_eq!(ledger.get_stats(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_keeps_referrals_and_referrer() {
        let ledger = store();
        ledger.register_user(1, None).await.unwrap();
        ledger.register_user(2, Some(1)).await.unwrap();
        ledger.record_click(1).await.unwrap();
        ledger.record_click(2).await.unwrap();
        ledger.credit_referral(1).await.unwrap();

        assert_eq!(ledger.reset_all_clicks().await.unwrap(), 2);

        assert_eq!(
            ledger.get_stats(1).await.unwrap(),
            Some(Stats { clicks: 0, referrals: 1 })
        );
        assert_eq!(ledger.get_clicks(2).await.unwrap(), 0);
        assert_eq!(ledger.get_referred_by(2).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_referral_credited_once_at_threshold() {
        let ledger = store();
        ledger.register_user(100, None).await.unwrap();
        for _ in 0..20 {
            ledger.record_ad_view(100, THRESHOLD).await.unwrap();
        }
        assert_eq!(ledger.get_clicks(100).await.unwrap(), 20);

        ledger.register_user(200, Some(100)).await.unwrap();
        for n in 1..=19 {
            let view = ledger.record_ad_view(200, THRESHOLD).await.unwrap();
            assert_eq!(view.clicks, n);
            assert_eq!(view.credited_referrer, None);
        }

        let view = ledger.record_ad_view(200, THRESHOLD).await.unwrap();
        assert_eq!(view.clicks, 20);
        assert_eq!(view.credited_referrer, Some(100));
        assert_eq!(ledger.get_stats(100).await.unwrap().unwrap().referrals, 1);

        for _ in 0..3 {
            let view = ledger.record_ad_view(200, THRESHOLD).await.unwrap();
            assert_eq!(view.credited_referrer, None);
        }
        assert_eq!(ledger.get_stats(100).await.unwrap().unwrap().referrals, 1);
    }

    #[tokio::test]
    async fn test_qualifying_with_unregistered_referrer() {
        let ledger = store();
        ledger.register_user(2, Some(999)).await.unwrap();
        let mut last = None;
        for _ in 0..THRESHOLD {
            last = Some(ledger.record_ad_view(2, THRESHOLD).await.unwrap());
        }
        let view = last.unwrap();
        assert_eq!(view.clicks, THRESHOLD);
        assert_eq!(view.credited_referrer, None);
    }

    #[tokio::test]
    async fn test_list_qualified_and_summarize() {
        let ledger = store();
        for id in [3, 1, 2] {
            ledger.register_user(id, None).await.unwrap();
        }
        for _ in 0..3 {
            ledger.record_click(1).await.unwrap();
        }
        ledger.record_click(2).await.unwrap();

        assert_eq!(ledger.list_qualified(3).await.unwrap(), vec![1]);
        assert_eq!(ledger.list_qualified(1).await.unwrap(), vec![1, 2]);

        let summary = ledger.summarize().await.unwrap();
        assert_eq!(
            summary,
            vec![
                ClickSummary { user_id: 1, clicks: 3 },
                ClickSummary { user_id: 2, clicks: 1 },
                ClickSummary { user_id: 3, clicks: 0 },
            ]
        );
        assert_eq!(ledger.user_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_open_file_persists() {
        let path = std::env::temp_dir().join(format!(
            "ad_rewards_bot_ledger_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let ledger = LedgerStore::open(&path).unwrap();
            ledger.register_user(1, None).await.unwrap();
            ledger.record_click(1).await.unwrap();
        }

        let reopened = LedgerStore::open(&path).unwrap();
        assert_eq!(reopened.get_clicks(1).await.unwrap(), 1);

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }
}
