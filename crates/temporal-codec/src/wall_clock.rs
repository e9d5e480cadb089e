//! Kind-tagged civil date-times ⇄ tokens.
//!
//! Encoding follows one function per [`DateHandler`]:
//!
//! | Handler          | Utc                            | Local                    | Unspecified                          |
//! |------------------|--------------------------------|--------------------------|--------------------------------------|
//! | TimestampOffset  | `/Date(ms)/`, `+0000` if asked | `/Date(ms±HHMM)/`        | `/Date(ms-0000)/`, ms local-adjusted |
//! | DcjsCompatible   | `/Date(ms)/`                   | `/Date(ms±HHMM)/`        | same as Local                        |
//! | Iso8601          | `…fffffffZ`                    | `…fffffff±HH:MM`         | `…fffffff`                           |
//!
//! With `assume_utc`, Unspecified values take the Utc column. Decoding infers
//! the kind from the token shape: no offset means Utc, an offset means
//! Unspecified (TimestampOffset) or Local (DcjsCompatible), and ISO tokens map
//! `Z` to Utc and everything else to Local.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{DateHandler, FormatConfig};
use crate::epoch::{check_year, from_unix_millis, to_unix_millis, MILLIS_PER_MINUTE};
use crate::error::{CodecError, Result};
use crate::offset::{validate_offset, LocalOffsetProvider};
use crate::token::{
    format_iso_body, format_offset, format_wcf, is_wcf, parse_iso, parse_wcf, IsoSuffix,
    UNSPECIFIED_SENTINEL, UTC_OFFSET_SUFFIX,
};

// ── Data model ──────────────────────────────────────────────────────────────

/// How a civil date-time's fields relate to universal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateTimeKind {
    /// Fields are universal time.
    Utc,
    /// Fields are universal time shifted by the local offset.
    Local,
    /// No declared relation.
    #[default]
    Unspecified,
}

/// Calendar fields with 100ns resolution, tagged with a [`DateTimeKind`].
///
/// Always a real proleptic-Gregorian date in years 1..=9999 with a fraction
/// strictly below one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CivilDateTime {
    civil: NaiveDateTime,
    kind: DateTimeKind,
}

impl CivilDateTime {
    /// Build from individual fields. `ticks` is the sub-second part in 100ns
    /// units.
    ///
    /// # Errors
    ///
    /// [`CodecError::Range`] for a non-existent date, a time-of-day field out
    /// of range, `ticks >= 10_000_000` or a year outside 1..=9999.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        ticks: u32,
        kind: DateTimeKind,
    ) -> Result<Self> {
        if ticks >= 10_000_000 {
            return Err(CodecError::Range(format!("{} ticks is a full second", ticks)));
        }
        let civil = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_nano_opt(hour, minute, second, ticks * 100))
            .ok_or_else(|| {
                CodecError::Range(format!(
                    "no such date-time {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ))
            })?;
        CivilDateTime::from_naive(civil, kind)
    }

    /// Wrap chrono fields. Sub-tick nanoseconds are truncated.
    pub fn from_naive(civil: NaiveDateTime, kind: DateTimeKind) -> Result<Self> {
        let nanos = civil.nanosecond();
        if nanos >= 1_000_000_000 {
            return Err(CodecError::Range("leap seconds are not representable".to_string()));
        }
        let civil = civil
            .with_nanosecond(nanos / 100 * 100)
            .ok_or_else(|| CodecError::Range(format!("invalid fraction in {}", civil)))?;
        Ok(CivilDateTime {
            civil: check_year(civil)?,
            kind,
        })
    }

    pub fn utc(civil: NaiveDateTime) -> Result<Self> {
        CivilDateTime::from_naive(civil, DateTimeKind::Utc)
    }

    pub fn local(civil: NaiveDateTime) -> Result<Self> {
        CivilDateTime::from_naive(civil, DateTimeKind::Local)
    }

    pub fn unspecified(civil: NaiveDateTime) -> Result<Self> {
        CivilDateTime::from_naive(civil, DateTimeKind::Unspecified)
    }

    pub fn civil(&self) -> NaiveDateTime {
        self.civil
    }

    pub fn kind(&self) -> DateTimeKind {
        self.kind
    }

    /// The same fields under another kind.
    pub fn with_kind(self, kind: DateTimeKind) -> Self {
        CivilDateTime { kind, ..self }
    }

    pub fn year(&self) -> i32 {
        self.civil.year()
    }

    pub fn month(&self) -> u32 {
        self.civil.month()
    }

    pub fn day(&self) -> u32 {
        self.civil.day()
    }

    pub fn hour(&self) -> u32 {
        self.civil.hour()
    }

    pub fn minute(&self) -> u32 {
        self.civil.minute()
    }

    pub fn second(&self) -> u32 {
        self.civil.second()
    }

    /// Sub-second part in 100ns ticks, `0..10_000_000`.
    pub fn ticks(&self) -> u32 {
        self.civil.nanosecond() / 100
    }
}

// ── Encode ──────────────────────────────────────────────────────────────────

/// Encode a civil date-time under `cfg`.
///
/// # Errors
///
/// [`CodecError::Range`] if the provider returns an offset beyond ±14:00 or
/// converting to UTC leaves the representable years.
///
/// # Examples
///
/// ```
/// use temporal_codec::{encode_datetime, CivilDateTime, DateTimeKind, FixedOffsetProvider, FormatConfig};
///
/// let value = CivilDateTime::new(1994, 11, 24, 0, 0, 0, 0, DateTimeKind::Utc).unwrap();
/// let token = encode_datetime(&value, &FormatConfig::default(), &FixedOffsetProvider::utc()).unwrap();
/// assert_eq!(token, "/Date(785635200000)/");
/// ```
pub fn encode_datetime<P: LocalOffsetProvider + ?Sized>(
    value: &CivilDateTime,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<String> {
    let value = if cfg.always_use_utc {
        to_universal(value, cfg, offsets)?
    } else {
        *value
    };

    match cfg.date_handler {
        DateHandler::TimestampOffset => encode_timestamp_offset(&value, cfg, offsets),
        DateHandler::DcjsCompatible => encode_dcjs(&value, cfg, offsets),
        DateHandler::Iso8601 => encode_iso8601(&value, cfg, offsets),
    }
}

fn encode_timestamp_offset<P: LocalOffsetProvider + ?Sized>(
    value: &CivilDateTime,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<String> {
    let civil = value.civil();
    match effective_kind(value, cfg) {
        DateTimeKind::Utc => {
            let suffix = if cfg.append_utc_offset {
                UTC_OFFSET_SUFFIX
            } else {
                ""
            };
            Ok(format_wcf(to_unix_millis(&civil), suffix))
        }
        DateTimeKind::Local => {
            let offset = local_offset(offsets, &civil)?;
            Ok(format_wcf(
                local_to_unix_millis(&civil, offset),
                &format_offset(offset, ""),
            ))
        }
        DateTimeKind::Unspecified => {
            let offset = local_offset(offsets, &civil)?;
            Ok(format_wcf(
                local_to_unix_millis(&civil, offset),
                UNSPECIFIED_SENTINEL,
            ))
        }
    }
}

fn encode_dcjs<P: LocalOffsetProvider + ?Sized>(
    value: &CivilDateTime,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<String> {
    let civil = value.civil();
    match effective_kind(value, cfg) {
        // DataContract never decorates UTC, whatever append_utc_offset says.
        DateTimeKind::Utc => Ok(format_wcf(to_unix_millis(&civil), "")),
        DateTimeKind::Local | DateTimeKind::Unspecified => {
            let offset = local_offset(offsets, &civil)?;
            Ok(format_wcf(
                local_to_unix_millis(&civil, offset),
                &format_offset(offset, ""),
            ))
        }
    }
}

fn encode_iso8601<P: LocalOffsetProvider + ?Sized>(
    value: &CivilDateTime,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<String> {
    let civil = value.civil();
    let body = format_iso_body(&civil);
    match effective_kind(value, cfg) {
        DateTimeKind::Utc => Ok(body + "Z"),
        DateTimeKind::Local => {
            let offset = local_offset(offsets, &civil)?;
            Ok(body + &format_offset(offset, ":"))
        }
        DateTimeKind::Unspecified => Ok(body),
    }
}

fn effective_kind(value: &CivilDateTime, cfg: &FormatConfig) -> DateTimeKind {
    match value.kind() {
        DateTimeKind::Unspecified if cfg.assume_utc => DateTimeKind::Utc,
        kind => kind,
    }
}

/// Rewrite a value as UTC for `always_use_utc`.
fn to_universal<P: LocalOffsetProvider + ?Sized>(
    value: &CivilDateTime,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<CivilDateTime> {
    match effective_kind(value, cfg) {
        DateTimeKind::Utc => Ok(value.with_kind(DateTimeKind::Utc)),
        DateTimeKind::Local | DateTimeKind::Unspecified => {
            let offset = local_offset(offsets, &value.civil())?;
            let utc = shift_minutes(&value.civil(), -offset)?;
            debug!(from = %value.civil(), to = %utc, offset, "normalised wall clock to UTC");
            CivilDateTime::utc(utc)
        }
    }
}

// ── Decode ──────────────────────────────────────────────────────────────────

/// A decoded value plus the offset of its fields from UTC, when the token
/// pins it down.
struct Decoded {
    value: CivilDateTime,
    offset_minutes: Option<i32>,
}

/// Decode a token under `cfg`, inferring the kind.
///
/// `/Date()/` and ISO tokens are both recognised whatever the handler;
/// the handler only decides the kind of offset-bearing `/Date()/` tokens.
///
/// # Errors
///
/// [`CodecError::Format`] for a malformed token, [`CodecError::Range`] for a
/// non-existent date, an offset beyond ±14:00 or an instant outside years
/// 1..=9999.
pub fn decode_datetime<P: LocalOffsetProvider + ?Sized>(
    token: &str,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<CivilDateTime> {
    let decoded = if is_wcf(token) {
        decode_wcf(token, cfg)?
    } else {
        decode_iso8601(token, cfg)?
    };

    if cfg.always_use_utc && decoded.value.kind() != DateTimeKind::Utc {
        return normalise_to_utc(decoded, offsets);
    }
    Ok(decoded.value)
}

fn decode_wcf(token: &str, cfg: &FormatConfig) -> Result<Decoded> {
    let wcf = parse_wcf(token)?;
    match wcf.offset_minutes {
        None => {
            trace!(token, "no offset suffix, decoding as UTC");
            Ok(Decoded {
                value: CivilDateTime::utc(from_unix_millis(wcf.millis)?)?,
                offset_minutes: Some(0),
            })
        }
        Some(offset) => {
            let kind = match cfg.date_handler {
                DateHandler::DcjsCompatible => DateTimeKind::Local,
                DateHandler::TimestampOffset | DateHandler::Iso8601 => DateTimeKind::Unspecified,
            };
            let millis = wcf
                .millis
                .checked_add(i64::from(offset) * MILLIS_PER_MINUTE)
                .ok_or_else(|| CodecError::Range(format!("'{}' overflows", token)))?;
            trace!(token, offset, ?kind, "offset suffix present");
            Ok(Decoded {
                value: CivilDateTime::from_naive(from_unix_millis(millis)?, kind)?,
                offset_minutes: Some(offset),
            })
        }
    }
}

fn decode_iso8601(token: &str, cfg: &FormatConfig) -> Result<Decoded> {
    let iso = parse_iso(token)?;
    let (kind, offset_minutes) = match iso.suffix {
        IsoSuffix::Zulu => (DateTimeKind::Utc, Some(0)),
        IsoSuffix::Offset(offset) => (DateTimeKind::Local, Some(offset)),
        IsoSuffix::None if cfg.assume_utc => (DateTimeKind::Utc, Some(0)),
        IsoSuffix::None => (DateTimeKind::Local, None),
    };
    trace!(token, ?kind, "decoded ISO 8601 token");
    Ok(Decoded {
        value: CivilDateTime::from_naive(iso.civil, kind)?,
        offset_minutes,
    })
}

fn normalise_to_utc<P: LocalOffsetProvider + ?Sized>(
    decoded: Decoded,
    offsets: &P,
) -> Result<CivilDateTime> {
    let civil = decoded.value.civil();
    let offset = match decoded.offset_minutes {
        Some(offset) => offset,
        None => local_offset(offsets, &civil)?,
    };
    let utc = shift_minutes(&civil, -offset)?;
    debug!(from = %civil, to = %utc, offset, "normalised decoded value to UTC");
    CivilDateTime::utc(utc)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn local_offset<P: LocalOffsetProvider + ?Sized>(
    offsets: &P,
    civil: &NaiveDateTime,
) -> Result<i32> {
    validate_offset(offsets.offset_for(civil))
}

/// Epoch milliseconds of a local wall clock at `offset` minutes east of UTC.
fn local_to_unix_millis(civil: &NaiveDateTime, offset: i32) -> i64 {
    to_unix_millis(civil) - i64::from(offset) * MILLIS_PER_MINUTE
}

fn shift_minutes(civil: &NaiveDateTime, minutes: i32) -> Result<NaiveDateTime> {
    civil
        .checked_add_signed(TimeDelta::minutes(i64::from(minutes)))
        .ok_or_else(|| CodecError::Range(format!("{} shifted by {} minutes", civil, minutes)))
        .and_then(check_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::FixedOffsetProvider;
    use proptest::prelude::*;

    /// Local zone used throughout: UTC-07:00.
    fn mountain() -> FixedOffsetProvider {
        FixedOffsetProvider::hours(-7).unwrap()
    }

    fn cfg(handler: DateHandler) -> FormatConfig {
        FormatConfig::new(handler)
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, kind: DateTimeKind) -> CivilDateTime {
        CivilDateTime::new(y, mo, d, h, mi, s, 0, kind).unwrap()
    }

    /// 2013-06-14 19:43:37.663
    fn parsed_wall_clock(kind: DateTimeKind) -> CivilDateTime {
        CivilDateTime::new(2013, 6, 14, 19, 43, 37, 6_630_000, kind).unwrap()
    }

    // ── Data model ──────────────────────────────────────────────────────

    #[test]
    fn test_new_rejects_impossible_dates() {
        let err = CivilDateTime::new(2013, 2, 29, 0, 0, 0, 0, DateTimeKind::Utc).unwrap_err();
        assert!(matches!(err, CodecError::Range(_)));
        assert!(CivilDateTime::new(2013, 1, 1, 0, 0, 0, 10_000_000, DateTimeKind::Utc).is_err());
        assert!(CivilDateTime::new(0, 1, 1, 0, 0, 0, 0, DateTimeKind::Utc).is_err());
        assert!(CivilDateTime::new(10_000, 1, 1, 0, 0, 0, 0, DateTimeKind::Utc).is_err());
    }

    #[test]
    fn test_from_naive_truncates_below_ticks() {
        let naive = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_nano_opt(0, 0, 0, 123_456_789)
            .unwrap();
        let value = CivilDateTime::local(naive).unwrap();
        assert_eq!(value.ticks(), 1_234_567);
        assert_eq!(value.kind(), DateTimeKind::Local);
    }

    #[test]
    fn test_with_kind_keeps_fields() {
        let value = dt(1994, 11, 24, 1, 2, 3, DateTimeKind::Unspecified).with_kind(DateTimeKind::Utc);
        assert_eq!(value.kind(), DateTimeKind::Utc);
        assert_eq!((value.hour(), value.minute(), value.second()), (1, 2, 3));
    }

    // ── TimestampOffset ─────────────────────────────────────────────────

    #[test]
    fn test_timestamp_offset_utc() {
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Utc);
        let token = encode_datetime(&value, &cfg(DateHandler::TimestampOffset), &mountain()).unwrap();
        assert_eq!(token, "/Date(785635200000)/");
    }

    #[test]
    fn test_timestamp_offset_local() {
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Local);
        let token = encode_datetime(&value, &cfg(DateHandler::TimestampOffset), &mountain()).unwrap();
        assert_eq!(token, "/Date(785660400000-0700)/");
    }

    #[test]
    fn test_timestamp_offset_unspecified_uses_sentinel() {
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Unspecified);
        let token = encode_datetime(&value, &cfg(DateHandler::TimestampOffset), &mountain()).unwrap();
        assert_eq!(token, "/Date(785660400000-0000)/");
    }

    #[test]
    fn test_timestamp_offset_unspecified_assume_utc() {
        let config = cfg(DateHandler::TimestampOffset).with_assume_utc(true);
        let token = encode_datetime(
            &parsed_wall_clock(DateTimeKind::Unspecified),
            &config,
            &mountain(),
        )
        .unwrap();
        assert_eq!(token, "/Date(1371239017663)/");
    }

    #[test]
    fn test_timestamp_offset_utc_append_utc_offset() {
        let config = cfg(DateHandler::TimestampOffset).with_append_utc_offset(true);
        let token =
            encode_datetime(&parsed_wall_clock(DateTimeKind::Utc), &config, &mountain()).unwrap();
        assert_eq!(token, "/Date(1371239017663+0000)/");
    }

    #[test]
    fn test_timestamp_offset_decode_without_offset_is_utc() {
        let value =
            decode_datetime("/Date(785635200000)/", &cfg(DateHandler::TimestampOffset), &mountain())
                .unwrap();
        assert_eq!(value, dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Utc));
    }

    #[test]
    fn test_timestamp_offset_decode_with_offset_is_unspecified() {
        let value = decode_datetime(
            "/Date(785660400000-0700)/",
            &cfg(DateHandler::TimestampOffset),
            &mountain(),
        )
        .unwrap();
        assert_eq!(value, dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Unspecified));
    }

    #[test]
    fn test_timestamp_offset_decode_zero_offset_is_unspecified() {
        let value = decode_datetime(
            "/Date(785635200000+0000)/",
            &cfg(DateHandler::TimestampOffset),
            &mountain(),
        )
        .unwrap();
        assert_eq!(value, dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Unspecified));
    }

    #[test]
    fn test_timestamp_offset_round_trip_utc() {
        let original = dt(2012, 7, 25, 16, 17, 0, DateTimeKind::Utc);
        let config = cfg(DateHandler::TimestampOffset);
        let token = encode_datetime(&original, &config, &mountain()).unwrap();
        assert_eq!(decode_datetime(&token, &config, &mountain()).unwrap(), original);
    }

    // ── DCJSCompatible ──────────────────────────────────────────────────

    #[test]
    fn test_dcjs_utc() {
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Utc);
        let token = encode_datetime(&value, &cfg(DateHandler::DcjsCompatible), &mountain()).unwrap();
        assert_eq!(token, "/Date(785635200000)/");
    }

    #[test]
    fn test_dcjs_local_and_unspecified_share_a_token() {
        let config = cfg(DateHandler::DcjsCompatible);
        let local = encode_datetime(&dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Local), &config, &mountain())
            .unwrap();
        let unspecified = encode_datetime(
            &dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Unspecified),
            &config,
            &mountain(),
        )
        .unwrap();
        assert_eq!(local, "/Date(785660400000-0700)/");
        assert_eq!(unspecified, local);
    }

    #[test]
    fn test_dcjs_never_appends_utc_offset() {
        let config = cfg(DateHandler::DcjsCompatible).with_append_utc_offset(true);
        let token =
            encode_datetime(&parsed_wall_clock(DateTimeKind::Utc), &config, &mountain()).unwrap();
        assert_eq!(token, "/Date(1371239017663)/");
    }

    #[test]
    fn test_dcjs_unspecified_assume_utc() {
        let config = cfg(DateHandler::DcjsCompatible).with_assume_utc(true);
        let token = encode_datetime(
            &parsed_wall_clock(DateTimeKind::Unspecified),
            &config,
            &mountain(),
        )
        .unwrap();
        assert_eq!(token, "/Date(1371239017663)/");
    }

    #[test]
    fn test_dcjs_decode_kinds() {
        let config = cfg(DateHandler::DcjsCompatible);
        for kind in [DateTimeKind::Utc, DateTimeKind::Local, DateTimeKind::Unspecified] {
            let original = dt(1994, 11, 24, 0, 0, 0, kind);
            let token = encode_datetime(&original, &config, &mountain()).unwrap();
            let decoded = decode_datetime(&token, &config, &mountain()).unwrap();
            let expected = if kind == DateTimeKind::Utc {
                DateTimeKind::Utc
            } else {
                DateTimeKind::Local
            };
            assert_eq!(decoded, original.with_kind(expected), "{kind:?}");
        }
    }

    // ── ISO 8601 ────────────────────────────────────────────────────────

    #[test]
    fn test_iso8601_utc() {
        let value = dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Utc);
        let token = encode_datetime(&value, &cfg(DateHandler::Iso8601), &mountain()).unwrap();
        assert_eq!(token, "1994-11-24T12:34:56.0000000Z");
    }

    #[test]
    fn test_iso8601_local() {
        let value = dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Local);
        let token = encode_datetime(&value, &cfg(DateHandler::Iso8601), &mountain()).unwrap();
        assert_eq!(token, "1994-11-24T12:34:56.0000000-07:00");
    }

    #[test]
    fn test_iso8601_unspecified_has_no_suffix() {
        let value = dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Unspecified);
        let token = encode_datetime(&value, &cfg(DateHandler::Iso8601), &mountain()).unwrap();
        assert_eq!(token, "1994-11-24T12:34:56.0000000");
    }

    #[test]
    fn test_iso8601_assume_utc_and_append_utc_offset() {
        let assume = cfg(DateHandler::Iso8601).with_assume_utc(true);
        let token = encode_datetime(
            &parsed_wall_clock(DateTimeKind::Unspecified),
            &assume,
            &mountain(),
        )
        .unwrap();
        assert_eq!(token, "2013-06-14T19:43:37.6630000Z");

        let append = cfg(DateHandler::Iso8601).with_append_utc_offset(true);
        let token =
            encode_datetime(&parsed_wall_clock(DateTimeKind::Utc), &append, &mountain()).unwrap();
        assert_eq!(token, "2013-06-14T19:43:37.6630000Z");
    }

    #[test]
    fn test_iso8601_decode_z_is_utc_regardless_of_always_use_utc() {
        for always in [false, true] {
            let config = cfg(DateHandler::Iso8601).with_always_use_utc(always);
            let value = decode_datetime("1994-11-24T12:34:56Z", &config, &mountain()).unwrap();
            assert_eq!(value, dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Utc));
        }
    }

    #[test]
    fn test_iso8601_decode_without_offset_is_local() {
        let value =
            decode_datetime("1994-11-24T12:34:56", &cfg(DateHandler::Iso8601), &mountain()).unwrap();
        assert_eq!(value, dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Local));
    }

    #[test]
    fn test_iso8601_decode_with_offset_keeps_wall_clock() {
        let value = decode_datetime(
            "1994-11-24T12:34:56-07:00",
            &cfg(DateHandler::Iso8601),
            &mountain(),
        )
        .unwrap();
        assert_eq!(value, dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Local));
    }

    #[test]
    fn test_iso8601_decode_assume_utc_relabels_bare_token() {
        let config = cfg(DateHandler::Iso8601).with_assume_utc(true);
        let value = decode_datetime("1994-11-24T12:34:56", &config, &mountain()).unwrap();
        assert_eq!(value.kind(), DateTimeKind::Utc);
        assert_eq!(value.hour(), 12);
    }

    #[test]
    fn test_seven_fraction_digits() {
        let value = CivilDateTime::new(2001, 2, 3, 4, 5, 6, 1, DateTimeKind::Utc).unwrap();
        let token = encode_datetime(&value, &cfg(DateHandler::Iso8601), &mountain()).unwrap();
        assert_eq!(token, "2001-02-03T04:05:06.0000001Z");
        assert_eq!(
            decode_datetime(&token, &cfg(DateHandler::Iso8601), &mountain()).unwrap(),
            value
        );
    }

    // ── AlwaysUseUtc ────────────────────────────────────────────────────

    #[test]
    fn test_always_use_utc_encodes_local_as_utc() {
        let config = cfg(DateHandler::Iso8601).with_always_use_utc(true);
        let value = dt(1994, 11, 24, 12, 34, 56, DateTimeKind::Local);
        let token = encode_datetime(&value, &config, &mountain()).unwrap();
        assert_eq!(token, "1994-11-24T19:34:56.0000000Z");

        let config = cfg(DateHandler::TimestampOffset).with_always_use_utc(true);
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Unspecified);
        let token = encode_datetime(&value, &config, &mountain()).unwrap();
        assert_eq!(token, "/Date(785660400000)/");
    }

    #[test]
    fn test_always_use_utc_decode_converts_offsets() {
        let config = cfg(DateHandler::Iso8601).with_always_use_utc(true);
        let value = decode_datetime("1994-11-24T12:34:56-07:00", &config, &mountain()).unwrap();
        assert_eq!(value, dt(1994, 11, 24, 19, 34, 56, DateTimeKind::Utc));

        let value = decode_datetime("1994-11-24T12:34:56", &config, &mountain()).unwrap();
        assert_eq!(value, dt(1994, 11, 24, 19, 34, 56, DateTimeKind::Utc));

        let config = cfg(DateHandler::TimestampOffset).with_always_use_utc(true);
        let value = decode_datetime("/Date(785660400000-0700)/", &config, &mountain()).unwrap();
        assert_eq!(value, dt(1994, 11, 24, 7, 0, 0, DateTimeKind::Utc));
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[test]
    fn test_decode_malformed_tokens() {
        let config = FormatConfig::default();
        for bad in ["", "yesterday", "/Date(12a)/", "1994-11-24T12:34:56+7"] {
            let err = decode_datetime(bad, &config, &mountain()).unwrap_err();
            assert!(matches!(err, CodecError::Format { .. }), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_decode_nonexistent_date_is_range_error() {
        let err =
            decode_datetime("2014-02-29T00:00:00Z", &FormatConfig::default(), &mountain()).unwrap_err();
        assert!(matches!(err, CodecError::Range(_)));
    }

    #[test]
    fn test_encode_rejects_implausible_provider_offset() {
        struct Broken;
        impl LocalOffsetProvider for Broken {
            fn offset_for(&self, _local: &NaiveDateTime) -> i32 {
                15 * 60
            }
        }
        let value = dt(1994, 11, 24, 0, 0, 0, DateTimeKind::Local);
        let err = encode_datetime(&value, &FormatConfig::default(), &Broken).unwrap_err();
        assert!(matches!(err, CodecError::Range(_)));
    }

    // ── Properties ──────────────────────────────────────────────────────

    fn any_handler() -> impl Strategy<Value = DateHandler> {
        prop_oneof![
            Just(DateHandler::TimestampOffset),
            Just(DateHandler::DcjsCompatible),
            Just(DateHandler::Iso8601),
        ]
    }

    proptest! {
        #[test]
        fn prop_utc_round_trip_all_handlers(
            millis in -62_135_596_800_000i64..253_402_300_800_000,
            handler in any_handler(),
        ) {
            let value = CivilDateTime::utc(from_unix_millis(millis).unwrap()).unwrap();
            let config = cfg(handler);
            let token = encode_datetime(&value, &config, &mountain()).unwrap();
            let decoded = decode_datetime(&token, &config, &mountain()).unwrap();
            prop_assert_eq!(decoded.kind(), DateTimeKind::Utc);
            prop_assert_eq!(to_unix_millis(&decoded.civil()), millis);
        }

        #[test]
        fn prop_assume_utc_matches_utc_token(
            millis in 0i64..4_102_444_800_000,
            handler in any_handler(),
        ) {
            let civil = from_unix_millis(millis).unwrap();
            let config = cfg(handler).with_assume_utc(true);
            let as_unspecified =
                encode_datetime(&CivilDateTime::unspecified(civil).unwrap(), &config, &mountain()).unwrap();
            let as_utc =
                encode_datetime(&CivilDateTime::utc(civil).unwrap(), &config, &mountain()).unwrap();
            prop_assert_eq!(as_unspecified, as_utc);
        }
    }
}
