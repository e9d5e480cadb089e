//! Explicit-offset instants ⇄ tokens.
//!
//! The offset travels with the value, so no kind inference happens. The one
//! lossy path is [`DateHandler::DcjsCompatible`] decoding, which keeps the
//! instant but replaces the written offset with the local one.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{DateHandler, FormatConfig};
use crate::epoch::{check_year, from_unix_millis, to_unix_millis};
use crate::error::{CodecError, Result};
use crate::offset::{validate_offset, LocalOffsetProvider};
use crate::token::{format_iso_body, format_offset, format_wcf, is_wcf, parse_iso, parse_wcf, IsoSuffix};

/// A point on the universal timeline plus the offset it is displayed in.
///
/// The derived equality compares both fields; use [`OffsetInstant::same_instant`]
/// to ignore the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OffsetInstant {
    utc: NaiveDateTime,
    offset_minutes: i32,
}

impl Default for OffsetInstant {
    /// `1970-01-01T00:00:00+00:00`.
    fn default() -> Self {
        OffsetInstant {
            utc: DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
            offset_minutes: 0,
        }
    }
}

impl OffsetInstant {
    /// From UTC civil fields and an offset in minutes east of UTC.
    pub fn new(utc: NaiveDateTime, offset_minutes: i32) -> Result<Self> {
        let offset_minutes = validate_offset(offset_minutes)?;
        let utc = truncate_to_ticks(utc)?;
        let instant = OffsetInstant {
            utc: check_year(utc)?,
            offset_minutes,
        };
        // the displayed wall clock must be representable too
        check_year(instant.local())?;
        Ok(instant)
    }

    /// From the wall clock as displayed at `offset_minutes`.
    pub fn from_local(local: NaiveDateTime, offset_minutes: i32) -> Result<Self> {
        let offset_minutes = validate_offset(offset_minutes)?;
        let utc = local
            .checked_sub_signed(TimeDelta::minutes(i64::from(offset_minutes)))
            .ok_or_else(|| CodecError::Range(format!("{} at offset {}", local, offset_minutes)))?;
        OffsetInstant::new(utc, offset_minutes)
    }

    pub fn utc(&self) -> NaiveDateTime {
        self.utc
    }

    /// Civil fields as displayed, `utc + offset`.
    pub fn local(&self) -> NaiveDateTime {
        self.utc + TimeDelta::minutes(i64::from(self.offset_minutes))
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    pub fn unix_millis(&self) -> i64 {
        to_unix_millis(&self.utc)
    }

    /// True when both denote the same absolute instant.
    pub fn same_instant(&self, other: &OffsetInstant) -> bool {
        self.utc == other.utc
    }

    /// The same instant displayed at another offset.
    pub fn with_offset(&self, offset_minutes: i32) -> Result<Self> {
        OffsetInstant::new(self.utc, offset_minutes)
    }

    pub fn to_fixed(&self) -> DateTime<FixedOffset> {
        // |offset| <= 14h is always inside FixedOffset's range
        let offset = FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or_else(|| Utc.fix());
        DateTime::from_naive_utc_and_offset(self.utc, offset)
    }
}

impl TryFrom<DateTime<FixedOffset>> for OffsetInstant {
    type Error = CodecError;

    fn try_from(dt: DateTime<FixedOffset>) -> Result<Self> {
        let seconds = dt.offset().local_minus_utc();
        if seconds % 60 != 0 {
            return Err(CodecError::Range(format!(
                "offset {} has a seconds component",
                dt.offset()
            )));
        }
        OffsetInstant::new(dt.naive_utc(), seconds / 60)
    }
}

fn truncate_to_ticks(dt: NaiveDateTime) -> Result<NaiveDateTime> {
    let nanos = dt.nanosecond();
    if nanos >= 1_000_000_000 {
        return Err(CodecError::Range("leap seconds are not representable".to_string()));
    }
    dt.with_nanosecond(nanos / 100 * 100)
        .ok_or_else(|| CodecError::Range(format!("invalid fraction in {}", dt)))
}

// ── Encode ──────────────────────────────────────────────────────────────────

/// Encode an offset instant. The offset is always written, `+0000` included.
///
/// ```
/// use chrono::NaiveDate;
/// use temporal_codec::{encode_offset_instant, DateHandler, FormatConfig, OffsetInstant};
///
/// let local = NaiveDate::from_ymd_opt(1994, 11, 24).unwrap().and_hms_opt(12, 34, 56).unwrap();
/// let value = OffsetInstant::from_local(local, -7 * 60).unwrap();
/// let cfg = FormatConfig::new(DateHandler::Iso8601);
/// assert_eq!(encode_offset_instant(&value, &cfg), "1994-11-24T12:34:56.0000000-07:00");
/// ```
pub fn encode_offset_instant(value: &OffsetInstant, cfg: &FormatConfig) -> String {
    match cfg.date_handler {
        DateHandler::TimestampOffset | DateHandler::DcjsCompatible => encode_wcf_offset(value),
        DateHandler::Iso8601 => encode_iso8601_offset(value),
    }
}

fn encode_wcf_offset(value: &OffsetInstant) -> String {
    format_wcf(value.unix_millis(), &format_offset(value.offset_minutes, ""))
}

fn encode_iso8601_offset(value: &OffsetInstant) -> String {
    format_iso_body(&value.local()) + &format_offset(value.offset_minutes, ":")
}

// ── Decode ──────────────────────────────────────────────────────────────────

/// Decode an offset instant.
///
/// `None` or an empty token yields [`OffsetInstant::default`]. A missing
/// offset or `Z` means `+00:00`. Under [`DateHandler::DcjsCompatible`] the
/// instant is kept and the offset replaced by the provider's local offset.
///
/// # Errors
///
/// [`CodecError::Format`] for a malformed token, [`CodecError::Range`] for a
/// non-existent date or an offset beyond ±14:00.
pub fn decode_offset_instant<P: LocalOffsetProvider + ?Sized>(
    token: Option<&str>,
    cfg: &FormatConfig,
    offsets: &P,
) -> Result<OffsetInstant> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        trace!("absent token, using the zero instant");
        return Ok(OffsetInstant::default());
    };

    let instant = if is_wcf(token) {
        let wcf = parse_wcf(token)?;
        OffsetInstant::new(from_unix_millis(wcf.millis)?, wcf.offset_minutes.unwrap_or(0))?
    } else {
        let iso = parse_iso(token)?;
        match iso.suffix {
            IsoSuffix::None | IsoSuffix::Zulu => OffsetInstant::new(iso.civil, 0)?,
            IsoSuffix::Offset(offset) => OffsetInstant::from_local(iso.civil, offset)?,
        }
    };

    match cfg.date_handler {
        DateHandler::DcjsCompatible => {
            let local = validate_offset(offsets.offset_for_utc(&instant.utc))?;
            if local != instant.offset_minutes {
                debug!(
                    token,
                    written = instant.offset_minutes,
                    local,
                    "DCJS decoding replaces the written offset with the local one"
                );
            }
            instant.with_offset(local)
        }
        DateHandler::TimestampOffset | DateHandler::Iso8601 => Ok(instant),
    }
}
