//! Lexical layer shared by the wall-clock and offset-instant codecs.
//!
//! Two token shapes exist:
//!
//! - WCF timestamps: `/Date(` millis [sign HHMM] `)/`, also accepted in the
//!   JSON-escaped `\/Date(...)\/` spelling.
//! - ISO 8601: `YYYY-MM-DDTHH:MM:SS[.fffffff][Z | ±HH:MM]`, or a bare
//!   `YYYY-MM-DD`.
//!
//! Parsing here is purely syntactic. Kind inference belongs to the codecs.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{CodecError, Result};
use crate::offset::validate_offset;

const WCF_PREFIX: &str = "/Date(";
const WCF_SUFFIX: &str = ")/";
const WCF_ESCAPED_PREFIX: &str = "\\/Date(";
const WCF_ESCAPED_SUFFIX: &str = ")\\/";

/// Offset suffix that marks an unspecified wall clock written as local time.
pub const UNSPECIFIED_SENTINEL: &str = "-0000";
/// Suffix appended to UTC timestamps when `append_utc_offset` is set.
pub const UTC_OFFSET_SUFFIX: &str = "+0000";

// ── WCF /Date()/ tokens ─────────────────────────────────────────────────────

/// A parsed `/Date()/` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WcfToken {
    pub millis: i64,
    /// `Some` whenever a sign and four digits followed the milliseconds,
    /// including `-0000` and `+0000`.
    pub offset_minutes: Option<i32>,
}

pub fn is_wcf(token: &str) -> bool {
    token.starts_with(WCF_PREFIX) || token.starts_with(WCF_ESCAPED_PREFIX)
}

pub fn format_wcf(millis: i64, offset_suffix: &str) -> String {
    format!("{}{}{}{}", WCF_PREFIX, millis, offset_suffix, WCF_SUFFIX)
}

pub fn parse_wcf(token: &str) -> Result<WcfToken> {
    let inner = token
        .strip_prefix(WCF_PREFIX)
        .and_then(|rest| rest.strip_suffix(WCF_SUFFIX))
        .or_else(|| {
            token
                .strip_prefix(WCF_ESCAPED_PREFIX)
                .and_then(|rest| rest.strip_suffix(WCF_ESCAPED_SUFFIX))
        })
        .ok_or_else(|| CodecError::format(token, "expected /Date(...)/"))?;

    // The millisecond count may itself start with '-', so the offset sign is
    // searched for after the first character.
    let split = inner
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i);

    let (millis_text, offset_text) = match split {
        Some(i) => (&inner[..i], Some(&inner[i..])),
        None => (inner, None),
    };

    let millis = parse_signed_integer(millis_text)
        .ok_or_else(|| CodecError::format(token, "milliseconds are not an integer"))?;

    let offset_minutes = match offset_text {
        Some(text) => Some(parse_compact_offset(token, text)?),
        None => None,
    };

    Ok(WcfToken {
        millis,
        offset_minutes,
    })
}

/// `±HHMM` with exactly four digits.
fn parse_compact_offset(token: &str, text: &str) -> Result<i32> {
    let (sign, digits) = split_sign(text)
        .ok_or_else(|| CodecError::format(token, "offset must start with + or -"))?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::format(token, "offset must be four digits"));
    }
    offset_from_parts(token, sign, &digits[..2], &digits[2..])
}

// ── ISO 8601 tokens ─────────────────────────────────────────────────────────

/// What followed the date-time body of an ISO token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoSuffix {
    None,
    Zulu,
    Offset(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoToken {
    /// Civil fields exactly as written.
    pub civil: NaiveDateTime,
    pub suffix: IsoSuffix,
}

/// `yyyy-MM-ddTHH:mm:ss.fffffff`, always seven fractional digits.
pub fn format_iso_body(civil: &NaiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:07}",
        civil.year(),
        civil.month(),
        civil.day(),
        civil.hour(),
        civil.minute(),
        civil.second(),
        civil.nanosecond() / 100
    )
}

pub fn parse_iso(token: &str) -> Result<IsoToken> {
    let bytes = token.as_bytes();
    if bytes.len() < 10 {
        return Err(CodecError::format(token, "expected YYYY-MM-DD"));
    }

    let year = fixed_digits(token, 0, 4, "year")?;
    expect_byte(token, 4, b'-')?;
    let month = fixed_digits(token, 5, 2, "month")?;
    expect_byte(token, 7, b'-')?;
    let day = fixed_digits(token, 8, 2, "day")?;

    if !(1..=12).contains(&month) {
        return Err(CodecError::format(token, "month must be 01-12"));
    }
    if !(1..=31).contains(&day) {
        return Err(CodecError::format(token, "day must be 01-31"));
    }
    if year == 0 {
        return Err(CodecError::Range(format!("year 0000 in '{}'", token)));
    }
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| CodecError::Range(format!("no such calendar date '{}'", &token[..10])))?;

    if bytes.len() == 10 {
        let civil = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CodecError::format(token, "invalid midnight"))?;
        return Ok(IsoToken {
            civil,
            suffix: IsoSuffix::None,
        });
    }

    expect_byte(token, 10, b'T')?;
    if bytes.len() < 19 {
        return Err(CodecError::format(token, "expected THH:MM:SS"));
    }
    let hour = fixed_digits(token, 11, 2, "hour")?;
    expect_byte(token, 13, b':')?;
    let minute = fixed_digits(token, 14, 2, "minute")?;
    expect_byte(token, 16, b':')?;
    let second = fixed_digits(token, 17, 2, "second")?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(CodecError::format(token, "time of day out of range"));
    }

    let mut pos = 19;
    let mut ticks = 0u32;
    if bytes.get(pos) == Some(&b'.') {
        let start = pos + 1;
        let end = start
            + bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
        let digits = &token[start..end];
        if digits.is_empty() || digits.len() > 7 {
            return Err(CodecError::format(token, "fraction must have 1-7 digits"));
        }
        ticks = parse_fraction_ticks(digits)
            .ok_or_else(|| CodecError::format(token, "fraction is not numeric"))?;
        pos = end;
    }

    let suffix = match &token[pos..] {
        "" => IsoSuffix::None,
        "Z" => IsoSuffix::Zulu,
        rest => IsoSuffix::Offset(parse_colon_offset(token, rest)?),
    };

    let civil = date
        .and_hms_nano_opt(hour, minute, second, ticks * 100)
        .ok_or_else(|| CodecError::format(token, "time of day out of range"))?;

    Ok(IsoToken { civil, suffix })
}

/// `±HH:MM`.
fn parse_colon_offset(token: &str, text: &str) -> Result<i32> {
    let (sign, rest) = split_sign(text)
        .ok_or_else(|| CodecError::format(token, "expected Z or ±HH:MM after the time"))?;
    let bytes = rest.as_bytes();
    if bytes.len() != 5
        || bytes[2] != b':'
        || !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit)
    {
        return Err(CodecError::format(token, "offset must be ±HH:MM"));
    }
    offset_from_parts(token, sign, &rest[..2], &rest[3..])
}

// ── Offsets ─────────────────────────────────────────────────────────────────

/// `±HHMM` (`separator = ""`) or `±HH:MM` (`separator = ":"`).
pub fn format_offset(minutes: i32, separator: &str) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("{}{:02}{}{:02}", sign, abs / 60, separator, abs % 60)
}

fn offset_from_parts(token: &str, sign: i32, hours: &str, minutes: &str) -> Result<i32> {
    let hours: i32 = hours
        .parse()
        .map_err(|_| CodecError::format(token, "offset hours are not numeric"))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| CodecError::format(token, "offset minutes are not numeric"))?;
    if minutes > 59 {
        return Err(CodecError::format(token, "offset minutes must be 00-59"));
    }
    validate_offset(sign * (hours * 60 + minutes))
}

// ── Small scanners ──────────────────────────────────────────────────────────

fn split_sign(text: &str) -> Option<(i32, &str)> {
    if let Some(rest) = text.strip_prefix('+') {
        Some((1, rest))
    } else {
        text.strip_prefix('-').map(|rest| (-1, rest))
    }
}

/// Optional leading `-` followed by ASCII digits only.
fn parse_signed_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Up to seven digits of a decimal fraction, right-padded to ticks.
pub(crate) fn parse_fraction_ticks(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    Some(value * 10u32.pow((7 - digits.len()) as u32))
}

fn fixed_digits(token: &str, start: usize, len: usize, field: &str) -> Result<u32> {
    let text = token
        .get(start..start + len)
        .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| CodecError::format(token, format!("{} is not numeric", field)))?;
    text.parse()
        .map_err(|_| CodecError::format(token, format!("{} is not numeric", field)))
}

fn expect_byte(token: &str, pos: usize, expected: u8) -> Result<()> {
    if token.as_bytes().get(pos) == Some(&expected) {
        Ok(())
    } else {
        Err(CodecError::format(
            token,
            format!("expected '{}' at position {}", expected as char, pos),
        ))
    }
}
