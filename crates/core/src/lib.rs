//! ldif2json core library.
//!
//! This crate turns LDIF directory exports into structured entries and,
//! optionally, into a tree following each entry's distinguished name:
//! the line-level LDIF parser, DN helpers, the hierarchy builder, TOML
//! configuration, and the file/JSON conversion pipeline.

pub mod config;
pub mod convert;
pub mod errors;
pub mod hierarchy;
pub mod ldif;
pub mod models;

// Re-exports for convenience.
pub use config::ConvertConfig;
pub use convert::Converter;
pub use errors::{ConfigError, ConvertError, CoreError, LdifError};
pub use hierarchy::{nest, DEFAULT_PARENT_ATTRIBUTE};
pub use ldif::{parse, parse_str, parse_with, ParseOptions};
pub use models::{AttrValue, Entry};
