//! Local-offset providers.
//!
//! The codec never computes a timezone offset itself. Whenever it needs "the
//! local offset" it asks a [`LocalOffsetProvider`], which answers in signed
//! minutes east of UTC for a given wall-clock reading.

use chrono::{Local, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::{CodecError, Result};

/// Largest offset magnitude accepted anywhere in the codec (±14:00).
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Source of the local UTC offset.
pub trait LocalOffsetProvider {
    /// Offset in minutes for a wall-clock reading expressed in the local zone.
    fn offset_for(&self, local: &NaiveDateTime) -> i32;

    /// Offset in minutes in force at a UTC instant.
    ///
    /// The default implementation guesses with the UTC reading and then asks
    /// again with the resulting local reading, which is exact everywhere except
    /// within a transition window.
    fn offset_for_utc(&self, utc: &NaiveDateTime) -> i32 {
        let guess = self.offset_for(utc);
        match utc.checked_add_signed(TimeDelta::minutes(i64::from(guess))) {
            Some(local) => self.offset_for(&local),
            None => guess,
        }
    }
}

impl<P: LocalOffsetProvider + ?Sized> LocalOffsetProvider for &P {
    fn offset_for(&self, local: &NaiveDateTime) -> i32 {
        (**self).offset_for(local)
    }

    fn offset_for_utc(&self, utc: &NaiveDateTime) -> i32 {
        (**self).offset_for_utc(utc)
    }
}

/// Reject offsets outside ±14:00.
pub fn validate_offset(minutes: i32) -> Result<i32> {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(CodecError::Range(format!(
            "UTC offset of {} minutes exceeds ±14:00",
            minutes
        )));
    }
    Ok(minutes)
}

// ── FixedOffsetProvider ─────────────────────────────────────────────────────

/// The same offset for every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedOffsetProvider {
    minutes: i32,
}

impl FixedOffsetProvider {
    pub fn new(minutes: i32) -> Result<Self> {
        Ok(FixedOffsetProvider {
            minutes: validate_offset(minutes)?,
        })
    }

    pub fn utc() -> Self {
        FixedOffsetProvider { minutes: 0 }
    }

    pub fn hours(hours: i32) -> Result<Self> {
        FixedOffsetProvider::new(hours * 60)
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }
}

impl LocalOffsetProvider for FixedOffsetProvider {
    fn offset_for(&self, _local: &NaiveDateTime) -> i32 {
        self.minutes
    }

    fn offset_for_utc(&self, _utc: &NaiveDateTime) -> i32 {
        self.minutes
    }
}

// ── TimeZoneOffsetProvider ──────────────────────────────────────────────────

/// Offsets from an IANA timezone, honouring daylight-saving rules.
///
/// Ambiguous wall clocks (fall back) resolve to the earliest offset. Wall
/// clocks inside a spring-forward gap use the offset in force when the reading
/// is interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneOffsetProvider {
    tz: Tz,
}

impl TimeZoneOffsetProvider {
    pub fn new(tz: Tz) -> Self {
        TimeZoneOffsetProvider { tz }
    }

    /// Build a provider from an IANA name such as `"America/Denver"`.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(TimeZoneOffsetProvider::new)
            .map_err(|_| CodecError::InvalidTimezone(format!("'{}'", name)))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl LocalOffsetProvider for TimeZoneOffsetProvider {
    fn offset_for(&self, local: &NaiveDateTime) -> i32 {
        let seconds = match self.tz.offset_from_local_datetime(local).earliest() {
            Some(offset) => offset.fix().local_minus_utc(),
            None => self.tz.offset_from_utc_datetime(local).fix().local_minus_utc(),
        };
        seconds / 60
    }

    fn offset_for_utc(&self, utc: &NaiveDateTime) -> i32 {
        self.tz.offset_from_utc_datetime(utc).fix().local_minus_utc() / 60
    }
}

// ── SystemOffsetProvider ────────────────────────────────────────────────────

/// Offsets from the operating system's configured local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemOffsetProvider;

impl LocalOffsetProvider for SystemOffsetProvider {
    fn offset_for(&self, local: &NaiveDateTime) -> i32 {
        let seconds = match Local.offset_from_local_datetime(local).earliest() {
            Some(offset) => offset.local_minus_utc(),
            None => Local.offset_from_utc_datetime(local).local_minus_utc(),
        };
        seconds / 60
    }

    fn offset_for_utc(&self, utc: &NaiveDateTime) -> i32 {
        Local.offset_from_utc_datetime(utc).local_minus_utc() / 60
    }
}
