//! # temporal-codec
//!
//! Temporal-value codec for JSON-like text formats.
//!
//! Converts kind-tagged wall-clock date-times, explicit-offset instants and
//! durations to and from the string tokens a structured-value writer embeds in
//! its output. Three historical date conventions are reproduced exactly,
//! including their quirks:
//!
//! - **TimestampOffset** — `/Date(785635200000)/`, `/Date(785660400000-0700)/`,
//!   and the `-0000` sentinel for unspecified wall clocks
//! - **DCJSCompatible** — `/Date()/` tokens as the DataContract JSON serializer
//!   writes them
//! - **ISO8601** — `1994-11-24T12:34:56.0000000Z` with seven fractional digits
//!
//! All functions are pure. The [`FormatConfig`] and the [`LocalOffsetProvider`]
//! are passed explicitly to every call; nothing is read from global state.
//!
//! ```
//! use temporal_codec::{CivilDateTime, DateHandler, DateTimeKind, FixedOffsetProvider, FormatConfig, TemporalCodec};
//!
//! let codec = TemporalCodec::new(FormatConfig::new(DateHandler::Iso8601), FixedOffsetProvider::utc());
//! let value = CivilDateTime::new(2013, 6, 14, 19, 43, 37, 6_630_000, DateTimeKind::Utc).unwrap();
//! let token = codec.encode_datetime(&value).unwrap();
//! assert_eq!(token, "2013-06-14T19:43:37.6630000Z");
//! assert_eq!(codec.decode_datetime(&token).unwrap(), value);
//! ```
//!
//! ## Modules
//!
//! - [`config`] — `DateHandler` and the per-call `FormatConfig`
//! - [`offset`] — Local-offset providers (fixed, IANA timezone, system)
//! - [`epoch`] — Civil fields ⇄ milliseconds/ticks since 1970-01-01
//! - [`wall_clock`] — `CivilDateTime` encode/decode with kind inference
//! - [`offset_instant`] — `OffsetInstant` encode/decode
//! - [`duration`] — `Duration` ⇄ `PT…S`
//! - [`codec`] — `TemporalCodec` facade
//! - [`error`] — Error types

pub mod codec;
pub mod config;
pub mod duration;
pub mod epoch;
pub mod error;
pub mod offset;
pub mod offset_instant;
mod token;
pub mod wall_clock;

pub use codec::TemporalCodec;
pub use config::{DateHandler, FormatConfig};
pub use duration::{decode_duration, encode_duration, Duration};
pub use error::CodecError;
pub use offset::{
    FixedOffsetProvider, LocalOffsetProvider, SystemOffsetProvider, TimeZoneOffsetProvider,
    MAX_OFFSET_MINUTES,
};
pub use offset_instant::{decode_offset_instant, encode_offset_instant, OffsetInstant};
pub use wall_clock::{decode_datetime, encode_datetime, CivilDateTime, DateTimeKind};
