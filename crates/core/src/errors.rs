//! Error types for the ldif2json core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ldif(#[from] LdifError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

// ---------------------------------------------------------------------------
// LDIF errors
// ---------------------------------------------------------------------------

/// Errors raised while turning LDIF lines into entries.
///
/// `line` is the 1-based number of the physical input line the offending
/// logical line started on; `record` is the 0-based index of the entry that
/// was under construction.
#[derive(Debug, Error)]
pub enum LdifError {
    /// A `::` value could not be Base64-decoded.
    #[error("malformed base64 value for attribute '{attribute}' (record {record}, line {line}): {source}")]
    MalformedBase64 {
        attribute: String,
        record: usize,
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    /// A `::` value decoded to bytes that are not valid UTF-8.
    #[error("base64 value for attribute '{attribute}' is not valid UTF-8 (record {record}, line {line})")]
    InvalidUtf8 {
        attribute: String,
        record: usize,
        line: usize,
    },

    /// A non-blank, non-comment line without any `:` separator.
    #[error("line {line} has no attribute separator (record {record}): {content:?}")]
    MissingSeparator {
        record: usize,
        line: usize,
        content: String,
    },
}

impl LdifError {
    /// The 1-based input line the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedBase64 { line, .. }
            | Self::InvalidUtf8 { line, .. }
            | Self::MissingSeparator { line, .. } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Conversion errors
// ---------------------------------------------------------------------------

/// Errors from the read → parse → nest → write pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading the input or writing the output failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input was not valid LDIF.
    #[error("failed to parse LDIF: {0}")]
    Ldif(#[from] LdifError),

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
