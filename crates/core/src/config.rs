//! TOML-based configuration for ldif2json.
//!
//! Every section is optional; a missing file section falls back to the
//! built-in defaults, which match the behaviour of the bare library calls.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::hierarchy::DEFAULT_PARENT_ATTRIBUTE;
use crate::ldif::ParseOptions;

/// Largest indent accepted for pretty-printed output.
pub const MAX_INDENT: usize = 16;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// LDIF parsing settings.
    #[serde(default)]
    pub parse: ParseConfig,

    /// DN hierarchy settings.
    #[serde(default)]
    pub nest: NestConfig,

    /// JSON output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings (consumed by the binary).
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Decode `name:: value` attributes (default true).
    #[serde(default = "default_true")]
    pub decode_base64: bool,

    /// Skip malformed lines with a warning instead of failing.
    #[serde(default)]
    pub lenient: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            decode_base64: true,
            lenient: false,
        }
    }
}

impl ParseConfig {
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            decode_base64: self.decode_base64,
            lenient: self.lenient,
        }
    }
}

// ---------------------------------------------------------------------------
// Nest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestConfig {
    /// Build the DN tree before writing.
    #[serde(default)]
    pub enabled: bool,

    /// Key holding child entries (default `subEntries`).
    #[serde(default = "default_parent_attribute")]
    pub parent_attribute: String,
}

fn default_parent_attribute() -> String {
    DEFAULT_PARENT_ATTRIBUTE.into()
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            parent_attribute: default_parent_attribute(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON document.
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Spaces per indentation level when pretty-printing.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    2
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: default_indent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum tracing level: trace, debug, info, warn, error, off.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl ConvertConfig {
    /// Default config file location: `<config dir>/ldif2json/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ldif2json").join("config.toml"))
    }

    /// Load a [`ConvertConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Render the config back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the config for semantic correctness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parent = self.nest.parent_attribute.as_str();
        if parent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nest.parent_attribute".into(),
                detail: "must not be empty".into(),
            });
        }
        if parent == "dn" {
            return Err(ConfigError::InvalidValue {
                field: "nest.parent_attribute".into(),
                detail: "must not shadow the 'dn' attribute".into(),
            });
        }

        if self.output.indent > MAX_INDENT {
            return Err(ConfigError::InvalidValue {
                field: "output.indent".into(),
                detail: format!("{} exceeds the maximum of {}", self.output.indent, MAX_INDENT),
            });
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".into(),
                detail: format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConvertConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConvertConfig::default());
        assert!(config.parse.decode_base64);
        assert!(!config.parse.lenient);
        assert!(!config.nest.enabled);
        assert_eq!(config.nest.parent_attribute, "subEntries");
        assert!(config.output.pretty);
        assert_eq!(config.output.indent, 2);
        assert_eq!(config.logging.level, "warn");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_sections() {
        let toml_str = r#"
[parse]
decode_base64 = false

[nest]
enabled = true
parent_attribute = "children"
"#;
        let config = ConvertConfig::from_toml_str(toml_str).unwrap();
        assert!(!config.parse.decode_base64);
        assert!(!config.parse.lenient);
        assert!(config.nest.enabled);
        assert_eq!(config.nest.parent_attribute, "children");
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_parse_options_from_config() {
        let config = ParseConfig {
            decode_base64: false,
            lenient: true,
        };
        let options = config.options();
        assert!(!options.decode_base64);
        assert!(options.lenient);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ConvertConfig::default();
        config.nest.parent_attribute = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "nest.parent_attribute"
        ));

        let mut config = ConvertConfig::default();
        config.nest.parent_attribute = "dn".into();
        assert!(config.validate().is_err());

        let mut config = ConvertConfig::default();
        config.output.indent = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "output.indent"
        ));

        let mut config = ConvertConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = ConvertConfig::default();
        config.logging.level = "DEBUG".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\npretty = false\n").unwrap();

        let config = ConvertConfig::load_from_file(&path).unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.output.indent, 2);
    }

    #[test]
    fn test_load_nonexistent() {
        let result = ConvertConfig::load_from_file("/nonexistent/ldif2json.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[nest\nenabled = ").unwrap();
        let result = ConvertConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let rendered = ConvertConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("parent_attribute = \"subEntries\""));
        let reparsed = ConvertConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, ConvertConfig::default());
    }
}
