//! Next-trigger computation for the daily rollover.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

/// Returns the instant of the next rollover: the calendar day after `now`,
/// at `at` in `now`'s time zone.
///
/// The result is always on the following day, even when `at` is still
/// ahead of `now` today.
#[must_use]
pub fn next_trigger<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);
    resolve(&now.timezone(), tomorrow.and_time(at))
}

/// Time left until `target`, zero if it already passed.
#[must_use]
pub fn until<Tz: TimeZone>(now: &DateTime<Tz>, target: &DateTime<Tz>) -> Duration {
    (target.clone() - now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Whether the wall clock has reached `target`.
#[must_use]
pub fn is_due<Tz: TimeZone>(now: &DateTime<Tz>, target: &DateTime<Tz>) -> bool {
    now >= target
}

/// Maps a wall-clock time to an instant, taking the earlier reading on a
/// DST fold and skipping forward over a DST gap.
fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
