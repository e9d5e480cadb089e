//! A configuration and an offset provider bundled for repeated use.
//!
//! The structured-value writer/reader holds one [`TemporalCodec`] per batch
//! and hands each temporal leaf to it. The codec owns no mutable state, so a
//! shared reference can be used from many threads at once when `P: Sync`.

use crate::config::FormatConfig;
use crate::duration::{decode_duration, encode_duration, Duration};
use crate::error::Result;
use crate::offset::{LocalOffsetProvider, SystemOffsetProvider};
use crate::offset_instant::{decode_offset_instant, encode_offset_instant, OffsetInstant};
use crate::wall_clock::{decode_datetime, encode_datetime, CivilDateTime};

#[derive(Debug, Clone)]
pub struct TemporalCodec<P = SystemOffsetProvider> {
    config: FormatConfig,
    offsets: P,
}

impl TemporalCodec<SystemOffsetProvider> {
    /// Codec using the operating system's local zone.
    pub fn with_system_offsets(config: FormatConfig) -> Self {
        TemporalCodec::new(config, SystemOffsetProvider)
    }
}

impl<P: LocalOffsetProvider> TemporalCodec<P> {
    pub fn new(config: FormatConfig, offsets: P) -> Self {
        TemporalCodec { config, offsets }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn offsets(&self) -> &P {
        &self.offsets
    }

    /// A codec sharing this provider under a different configuration.
    pub fn with_config(&self, config: FormatConfig) -> TemporalCodec<&P> {
        TemporalCodec::new(config, &self.offsets)
    }

    pub fn encode_datetime(&self, value: &CivilDateTime) -> Result<String> {
        encode_datetime(value, &self.config, &self.offsets)
    }

    pub fn decode_datetime(&self, token: &str) -> Result<CivilDateTime> {
        decode_datetime(token, &self.config, &self.offsets)
    }

    pub fn encode_offset_instant(&self, value: &OffsetInstant) -> String {
        encode_offset_instant(value, &self.config)
    }

    pub fn decode_offset_instant(&self, token: Option<&str>) -> Result<OffsetInstant> {
        decode_offset_instant(token, &self.config, &self.offsets)
    }

    pub fn encode_duration(&self, value: &Duration) -> String {
        encode_duration(value)
    }

    pub fn decode_duration(&self, token: &str) -> Result<Duration> {
        decode_duration(token)
    }
}
