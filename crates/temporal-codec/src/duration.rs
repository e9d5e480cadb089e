//! Durations ⇄ `PT…S` tokens.
//!
//! Encoding always writes whole seconds plus the shortest exact fraction,
//! e.g. `PT0S`, `PT0.0000001S`, `PT-90.5S`. Decoding additionally accepts the
//! XML-schema day/time form `[-]P[nD][T[nH][nM][n[.f]S]]`.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::Serialize;

use crate::epoch::{TICKS_PER_DAY, TICKS_PER_SECOND};
use crate::error::{CodecError, Result};
use crate::token::parse_fraction_ticks;

const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;

/// Signed span of 100ns ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Duration {
    ticks: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { ticks: 0 };

    pub const fn from_ticks(ticks: i64) -> Self {
        Duration { ticks }
    }

    pub const fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Convert a chrono span, truncating below 100ns.
    pub fn from_time_delta(delta: TimeDelta) -> Result<Self> {
        delta
            .num_seconds()
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(i64::from(delta.subsec_nanos() / 100)))
            .map(Duration::from_ticks)
            .ok_or_else(|| CodecError::Range(format!("{} does not fit in ticks", delta)))
    }

    pub fn to_time_delta(&self) -> TimeDelta {
        let seconds = self.ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = self.ticks.rem_euclid(TICKS_PER_SECOND) * 100;
        TimeDelta::seconds(seconds) + TimeDelta::nanoseconds(nanos)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_duration(self))
    }
}

impl FromStr for Duration {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        decode_duration(s)
    }
}

/// Encode a duration as `PT[-]<seconds>[.<fraction>]S`.
///
/// ```
/// use temporal_codec::{encode_duration, Duration};
///
/// assert_eq!(encode_duration(&Duration::ZERO), "PT0S");
/// assert_eq!(encode_duration(&Duration::from_ticks(1)), "PT0.0000001S");
/// assert_eq!(encode_duration(&Duration::from_ticks(-15_000_000)), "PT-1.5S");
/// ```
pub fn encode_duration(value: &Duration) -> String {
    let sign = if value.ticks < 0 { "-" } else { "" };
    let magnitude = value.ticks.unsigned_abs();
    let seconds = magnitude / TICKS_PER_SECOND as u64;
    let fraction = magnitude % TICKS_PER_SECOND as u64;

    if fraction == 0 {
        format!("PT{}{}S", sign, seconds)
    } else {
        let digits = format!("{:07}", fraction);
        format!("PT{}{}.{}S", sign, seconds, digits.trim_end_matches('0'))
    }
}

/// Decode a duration token.
///
/// # Errors
///
/// [`CodecError::Format`] when the `P`/`T`/`S` envelope or a number is
/// malformed, [`CodecError::Range`] when the total overflows 64-bit ticks.
pub fn decode_duration(token: &str) -> Result<Duration> {
    let malformed = |reason: &str| CodecError::format(token, reason);

    let (mut negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let rest = rest
        .strip_prefix('P')
        .ok_or_else(|| malformed("expected leading P"))?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total: i128 = 0;
    let mut components = 0;

    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix('D')
            .ok_or_else(|| malformed("only day components may precede T"))?;
        total += whole_number(token, days)? * i128::from(TICKS_PER_DAY);
        components += 1;
    }

    if let Some(mut time) = time_part {
        if let Some(unsigned) = time.strip_prefix('-') {
            if negative {
                return Err(malformed("sign given twice"));
            }
            negative = true;
            time = unsigned;
        }
        if time.is_empty() {
            return Err(malformed("T must be followed by a component"));
        }
        for (designator, unit) in [('H', TICKS_PER_HOUR), ('M', TICKS_PER_MINUTE)] {
            if let Some((number, remainder)) = time.split_once(designator) {
                total += whole_number(token, number)? * i128::from(unit);
                time = remainder;
                components += 1;
            }
        }
        if !time.is_empty() {
            let seconds = time
                .strip_suffix('S')
                .ok_or_else(|| malformed("expected trailing S"))?;
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds, None),
            };
            total += whole_number(token, whole)? * i128::from(TICKS_PER_SECOND);
            if let Some(fraction) = fraction {
                let ticks = parse_fraction_ticks(fraction)
                    .ok_or_else(|| malformed("fraction must have 1-7 digits"))?;
                total += i128::from(ticks);
            }
            components += 1;
        }
    }

    if components == 0 {
        return Err(malformed("no duration components"));
    }

    let signed = if negative { -total } else { total };
    i64::try_from(signed)
        .map(Duration::from_ticks)
        .map_err(|_| CodecError::Range(format!("'{}' overflows 64-bit ticks", token)))
}

fn whole_number(token: &str, digits: &str) -> Result<i128> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::format(token, format!("'{}' is not a whole number", digits)));
    }
    digits
        .parse::<u64>()
        .map(i128::from)
        .map_err(|_| CodecError::Range(format!("'{}' overflows 64-bit ticks", token)))
}
