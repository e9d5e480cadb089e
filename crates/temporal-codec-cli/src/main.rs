//! `datecodec` — encode and decode temporal tokens from the command line.
//!
//! ```text
//! datecodec encode-datetime 1994-11-24T00:00:00 --kind utc
//! datecodec --handler iso8601 --timezone America/Denver encode-datetime 1994-11-24T12:34:56 --kind local
//! datecodec decode-datetime '/Date(785660400000-0700)/'
//! datecodec decode-offset '1994-11-24T12:34:56-07:00'
//! datecodec encode-duration 1
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use temporal_codec::{
    CivilDateTime, DateHandler, DateTimeKind, Duration, FixedOffsetProvider, FormatConfig,
    LocalOffsetProvider, OffsetInstant, SystemOffsetProvider, TemporalCodec,
    TimeZoneOffsetProvider,
};

#[derive(Parser)]
#[command(
    name = "datecodec",
    version,
    about = "Encode and decode /Date()/, ISO 8601 and PT…S temporal tokens"
)]
struct Cli {
    /// JSON file holding a format configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Date handler: timestamp-offset, dcjs or iso8601
    #[arg(long, global = true)]
    handler: Option<DateHandler>,

    /// Treat unspecified wall clocks as UTC
    #[arg(long, global = true)]
    assume_utc: bool,

    /// Append +0000 to UTC /Date()/ tokens
    #[arg(long, global = true)]
    append_utc_offset: bool,

    /// Normalise everything to UTC
    #[arg(long, global = true)]
    always_use_utc: bool,

    /// Fixed local offset in minutes east of UTC
    #[arg(long, global = true, allow_negative_numbers = true, conflicts_with = "timezone")]
    offset_minutes: Option<i32>,

    /// IANA timezone used as the local zone (default: system zone)
    #[arg(long, global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a civil date-time (YYYY-MM-DDTHH:MM:SS[.fffffff])
    EncodeDatetime {
        value: String,
        #[arg(long, value_enum, default_value_t = KindArg::Unspecified)]
        kind: KindArg,
    },
    /// Decode a date-time token and print its fields and kind
    DecodeDatetime { token: String },
    /// Encode an RFC 3339 date-time with offset
    EncodeOffset { value: String },
    /// Decode an offset-instant token; omit the token for the zero value
    DecodeOffset { token: Option<String> },
    /// Encode a tick count (100ns units)
    EncodeDuration {
        #[arg(allow_negative_numbers = true)]
        ticks: i64,
    },
    /// Decode a duration token
    DecodeDuration {
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Utc,
    Local,
    Unspecified,
}

impl From<KindArg> for DateTimeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Utc => DateTimeKind::Utc,
            KindArg::Local => DateTimeKind::Local,
            KindArg::Unspecified => DateTimeKind::Unspecified,
        }
    }
}

/// Local zone selected on the command line.
enum Offsets {
    Fixed(FixedOffsetProvider),
    Zone(TimeZoneOffsetProvider),
    System(SystemOffsetProvider),
}

impl LocalOffsetProvider for Offsets {
    fn offset_for(&self, local: &NaiveDateTime) -> i32 {
        match self {
            Offsets::Fixed(p) => p.offset_for(local),
            Offsets::Zone(p) => p.offset_for(local),
            Offsets::System(p) => p.offset_for(local),
        }
    }

    fn offset_for_utc(&self, utc: &NaiveDateTime) -> i32 {
        match self {
            Offsets::Fixed(p) => p.offset_for_utc(utc),
            Offsets::Zone(p) => p.offset_for_utc(utc),
            Offsets::System(p) => p.offset_for_utc(utc),
        }
    }
}

#[derive(Serialize)]
struct OffsetOutput {
    utc: NaiveDateTime,
    local: NaiveDateTime,
    offset_minutes: i32,
    unix_millis: i64,
}

#[derive(Serialize)]
struct DurationOutput {
    ticks: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = TemporalCodec::new(load_config(&cli)?, select_offsets(&cli)?);

    match cli.command {
        Command::EncodeDatetime { value, kind } => {
            let civil = NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f")
                .with_context(|| format!("'{}' is not YYYY-MM-DDTHH:MM:SS[.f]", value))?;
            let value = CivilDateTime::from_naive(civil, kind.into())?;
            println!("{}", codec.encode_datetime(&value)?);
        }
        Command::DecodeDatetime { token } => {
            let value = codec.decode_datetime(&token)?;
            println!("{}", serde_json::to_string(&value)?);
        }
        Command::EncodeOffset { value } => {
            let parsed = DateTime::parse_from_rfc3339(&value)
                .with_context(|| format!("'{}' is not an RFC 3339 date-time", value))?;
            let instant = OffsetInstant::try_from(parsed)?;
            println!("{}", codec.encode_offset_instant(&instant));
        }
        Command::DecodeOffset { token } => {
            let instant = codec.decode_offset_instant(token.as_deref())?;
            let output = OffsetOutput {
                utc: instant.utc(),
                local: instant.local(),
                offset_minutes: instant.offset_minutes(),
                unix_millis: instant.unix_millis(),
            };
            println!("{}", serde_json::to_string(&output)?);
        }
        Command::EncodeDuration { ticks } => {
            println!("{}", codec.encode_duration(&Duration::from_ticks(ticks)));
        }
        Command::DecodeDuration { token } => {
            let duration = codec.decode_duration(&token)?;
            let output = DurationOutput {
                ticks: duration.ticks(),
            };
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}

/// Configuration file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<FormatConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            FormatConfig::from_json(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => FormatConfig::default(),
    };

    if let Some(handler) = cli.handler {
        config.date_handler = handler;
    }
    config.assume_utc |= cli.assume_utc;
    config.append_utc_offset |= cli.append_utc_offset;
    config.always_use_utc |= cli.always_use_utc;
    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

fn select_offsets(cli: &Cli) -> Result<Offsets> {
    if let Some(minutes) = cli.offset_minutes {
        return Ok(Offsets::Fixed(FixedOffsetProvider::new(minutes)?));
    }
    if let Some(name) = &cli.timezone {
        return Ok(Offsets::Zone(TimeZoneOffsetProvider::from_name(name)?));
    }
    Ok(Offsets::System(SystemOffsetProvider))
}
