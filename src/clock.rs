use crate::game::EpochMillis;
use chrono::{Local, NaiveDate, NaiveDateTime};

/// The rotation starts counting days from here. Changing this shifts which
/// word every player sees on a given date.
fn rotation_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("static epoch date is valid")
}

/// The only wall-clock reads in the crate live here; the engine itself takes
/// timestamps as arguments.
pub fn now_ms() -> EpochMillis {
    Local::now().timestamp_millis()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Returns the date id as YYYY-MM-DD (local time). Keys the per-day records
/// and shows up in the share title.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Rotates an index by whole days elapsed since the epoch, using a
/// non-negative modulo so dates before the epoch still land in [0, n). A pure
/// function of the calendar date, so every client on the same local day gets
/// the same index no matter the time of day.
pub fn daily_index(date: NaiveDate, n: usize) -> usize {
    debug_assert!(n > 0);
    let diff = (date - rotation_epoch()).num_days();
    let n = n as i64;
    (((diff % n) + n) % n) as usize
}

/// Milliseconds remaining to next local midnight.
pub fn ms_until_tomorrow(now: NaiveDateTime) -> i64 {
    let midnight = next_midnight(now);
    (midnight - now).num_milliseconds().max(0)
}

/// Wall-clock label for the next daily reset, shown in the quota message.
pub fn next_reset_label(now: NaiveDateTime) -> String {
    next_midnight(now).format("%H:%M").to_string()
}

/// Formats milliseconds as "Hh MMm SSs".
pub fn fmt_countdown(ms: i64) -> String {
    let s = (ms / 1000).max(0);
    let h = s / 3600;
    let m = (s % 3600) / 60;
    let ss = s % 60;
    format!("{}h {:02}m {:02}s", h, m, ss)
}

fn next_midnight(now: NaiveDateTime) -> NaiveDateTime {
    now.date()
        .succ_opt()
        .expect("calendar does not end tomorrow")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
}
