//! # Clock — UK Day Boundaries
//!
//! Daily objectives are scoped to the current calendar day in UK time:
//! GMT (UTC+0) in winter and BST (UTC+1) from 01:00 UTC on the last Sunday of
//! March until 01:00 UTC on the last Sunday of October.
//!
//! The boundary is recomputed on every call and never cached, so a server that
//! stays up across a clock change keeps scoping objectives correctly.
//!
//! Clock changes happen at 01:00 UTC, which is never local midnight, so the
//! start of a UK day is always a single unambiguous instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Last Sunday of a 31-day month (March and October are the only callers).
fn last_sunday_of(year: i32, month: u32) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last.weekday().num_days_from_sunday();
    Some(last - Duration::days(i64::from(back)))
}

/// British Summer Time window for `year` as `[start, end)` UTC instants.
pub fn bst_window(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = last_sunday_of(year, 3)?.and_hms_opt(1, 0, 0)?.and_utc();
    let end = last_sunday_of(year, 10)?.and_hms_opt(1, 0, 0)?.and_utc();
    Some((start, end))
}

/// Whether UK clocks are on BST at `instant`.
pub fn is_bst(instant: DateTime<Utc>) -> bool {
    match bst_window(instant.year()) {
        Some((start, end)) => instant >= start && instant < end,
        None => false,
    }
}

/// UK offset from UTC in effect at `instant`.
pub fn uk_offset(instant: DateTime<Utc>) -> Duration {
    if is_bst(instant) {
        Duration::hours(1)
    } else {
        Duration::zero()
    }
}

/// Calendar date in the UK at `instant`.
pub fn uk_date(instant: DateTime<Utc>) -> NaiveDate {
    (instant + uk_offset(instant)).date_naive()
}

/// The UTC instant at which the UK day containing `now` began.
///
/// The offset at midnight can differ from the offset at `now` on the two
/// clock-change Sundays, so midnight is first read as BST and only kept if BST
/// was actually in force at that instant.
pub fn uk_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = uk_date(now).and_time(NaiveTime::MIN).and_utc();
    let as_bst = midnight - Duration::hours(1);
    if is_bst(as_bst) {
        as_bst
    } else {
        midnight
    }
}

/// Start of the current UK day.
pub fn today_uk_midnight() -> DateTime<Utc> {
    uk_midnight(Utc::now())
}
