//! Per-call format configuration.
//!
//! A [`FormatConfig`] is a small `Copy` value threaded through every encode and
//! decode call. There is no process-wide setting: two callers using different
//! configurations at the same time never observe each other's choices, and
//! "resetting" simply means building [`FormatConfig::default`] again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

// ── DateHandler ─────────────────────────────────────────────────────────────

/// Which of the three date conventions the codec writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateHandler {
    /// `/Date(ms±HHMM)/`, with a `-0000` sentinel for unspecified wall clocks.
    #[default]
    TimestampOffset,
    /// `/Date(ms±HHMM)/` as written by the DataContract JSON serializer.
    #[serde(rename = "dcjs")]
    DcjsCompatible,
    /// `yyyy-MM-ddTHH:mm:ss.fffffff` with `Z`, `±HH:mm` or no suffix.
    Iso8601,
}

impl fmt::Display for DateHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateHandler::TimestampOffset => "timestamp-offset",
            DateHandler::DcjsCompatible => "dcjs",
            DateHandler::Iso8601 => "iso8601",
        };
        f.write_str(name)
    }
}

impl FromStr for DateHandler {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp-offset" | "timestampoffset" => Ok(DateHandler::TimestampOffset),
            "dcjs" | "dcjs-compatible" | "dcjscompatible" => Ok(DateHandler::DcjsCompatible),
            "iso8601" | "iso-8601" => Ok(DateHandler::Iso8601),
            other => Err(CodecError::InvalidConfig(format!(
                "unknown date handler '{}'",
                other
            ))),
        }
    }
}

// ── FormatConfig ────────────────────────────────────────────────────────────

/// Date handler plus the three flags that change defaulting rules.
///
/// ```
/// use temporal_codec::{DateHandler, FormatConfig};
///
/// let cfg = FormatConfig::new(DateHandler::Iso8601).with_assume_utc(true);
/// assert!(cfg.assume_utc);
/// assert!(!cfg.append_utc_offset);
/// assert_eq!(FormatConfig::reset(), FormatConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub date_handler: DateHandler,
    /// Treat `Unspecified` wall clocks as UTC instead of local time.
    pub assume_utc: bool,
    /// Append `+0000` to UTC `/Date()/` tokens (TimestampOffset only).
    pub append_utc_offset: bool,
    /// Normalise everything written and read to UTC.
    pub always_use_utc: bool,
}

impl FormatConfig {
    pub fn new(date_handler: DateHandler) -> Self {
        FormatConfig {
            date_handler,
            ..FormatConfig::default()
        }
    }

    /// The configuration in force before any caller customises it.
    pub fn reset() -> Self {
        FormatConfig::default()
    }

    pub fn with_date_handler(mut self, date_handler: DateHandler) -> Self {
        self.date_handler = date_handler;
        self
    }

    pub fn with_assume_utc(mut self, assume_utc: bool) -> Self {
        self.assume_utc = assume_utc;
        self
    }

    pub fn with_append_utc_offset(mut self, append_utc_offset: bool) -> Self {
        self.append_utc_offset = append_utc_offset;
        self
    }

    pub fn with_always_use_utc(mut self, always_use_utc: bool) -> Self {
        self.always_use_utc = always_use_utc;
        self
    }

    /// Load a configuration from a JSON object. Missing fields keep their
    /// defaults, e.g. `{"date_handler": "iso8601"}`.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(|e| CodecError::InvalidConfig(e.to_string()))
    }
}
