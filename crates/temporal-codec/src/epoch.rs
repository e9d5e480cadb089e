//! Civil UTC fields ⇄ time since the Unix epoch.
//!
//! Pure calendar arithmetic on the proleptic Gregorian calendar with no
//! timezone knowledge. Two independent derivations of epoch milliseconds are
//! provided:
//!
//! - [`to_unix_millis`] asks chrono for the timestamp directly.
//! - [`to_unix_millis_alt`] counts 100ns ticks from `0001-01-01T00:00:00` and
//!   subtracts [`UNIX_EPOCH_TICKS`].
//!
//! Both floor sub-millisecond remainders towards negative infinity and must
//! agree for every representable value.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use crate::error::{CodecError, Result};

pub const TICKS_PER_MILLISECOND: i64 = 10_000;
pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const TICKS_PER_DAY: i64 = 86_400 * TICKS_PER_SECOND;
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Ticks between `0001-01-01T00:00:00` and `1970-01-01T00:00:00`.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Years the codec can represent. Tokens carry four-digit years.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Milliseconds since the epoch for UTC civil fields, floored.
pub fn to_unix_millis(utc: &NaiveDateTime) -> i64 {
    utc.and_utc().timestamp_millis()
}

/// Milliseconds since the epoch via tick counting. Agrees with
/// [`to_unix_millis`] for years 1..=9999.
pub fn to_unix_millis_alt(utc: &NaiveDateTime) -> i64 {
    to_unix_ticks(utc).div_euclid(TICKS_PER_MILLISECOND)
}

/// 100ns ticks since `0001-01-01T00:00:00`.
pub fn civil_to_ticks(dt: &NaiveDateTime) -> i64 {
    let days = days_before_year(dt.year()) + i64::from(dt.ordinal0());
    let seconds = i64::from(dt.num_seconds_from_midnight());
    let sub_second = i64::from(dt.nanosecond() / 100);
    days * TICKS_PER_DAY + seconds * TICKS_PER_SECOND + sub_second
}

/// 100ns ticks since the Unix epoch (negative before 1970).
pub fn to_unix_ticks(utc: &NaiveDateTime) -> i64 {
    civil_to_ticks(utc) - UNIX_EPOCH_TICKS
}

/// UTC civil fields for a millisecond timestamp.
///
/// # Errors
///
/// Returns [`CodecError::Range`] when the instant falls outside years 1..=9999.
pub fn from_unix_millis(millis: i64) -> Result<NaiveDateTime> {
    let dt = DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| CodecError::Range(format!("{} ms since epoch", millis)))?;
    check_year(dt)
}

/// UTC civil fields for a tick timestamp, keeping sub-millisecond precision.
pub fn from_unix_ticks(ticks: i64) -> Result<NaiveDateTime> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    // rem_euclid < 10^7, so the nanosecond count fits in u32
    let nanos = (ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    let dt = DateTime::from_timestamp(seconds, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| CodecError::Range(format!("{} ticks since epoch", ticks)))?;
    check_year(dt)
}

pub(crate) fn check_year(dt: NaiveDateTime) -> Result<NaiveDateTime> {
    if (MIN_YEAR..=MAX_YEAR).contains(&dt.year()) {
        Ok(dt)
    } else {
        Err(CodecError::Range(format!(
            "year {} outside {}..={}",
            dt.year(),
            MIN_YEAR,
            MAX_YEAR
        )))
    }
}

/// Days from `0001-01-01` to January 1st of `year` (year >= 1).
fn days_before_year(year: i32) -> i64 {
    let y = i64::from(year) - 1;
    y * 365 + y / 4 - y / 100 + y / 400
}
