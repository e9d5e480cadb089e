//! Error types for temporal-codec operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The token does not match the grammar of the value being decoded.
    #[error("Invalid token '{token}': {reason}")]
    Format { token: String, reason: String },

    /// A syntactically valid value that cannot be represented: offsets beyond
    /// ±14:00, non-existent calendar dates, instants outside years 1..=9999.
    #[error("Out of range: {0}")]
    Range(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    pub(crate) fn format(token: &str, reason: impl Into<String>) -> Self {
        CodecError::Format {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
