//! Read → parse → nest → write pipeline.
//!
//! [`Converter`] wraps the pure parser and hierarchy builder with file and
//! stream handling, driven by a [`ConvertConfig`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::errors::ConvertError;
use crate::hierarchy::nest;
use crate::ldif::parse_with;
use crate::models::Entry;

/// Path spelling that stands for stdin.
pub const STDIN_PATH: &str = "-";

/// Converts LDIF input into JSON according to a [`ConvertConfig`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Parse (and optionally nest) an LDIF document held in memory.
    pub fn convert_str(&self, text: &str) -> Result<Vec<Entry>, ConvertError> {
        self.convert_lines(text.lines())
    }

    /// Parse (and optionally nest) LDIF read from `reader`.
    pub fn convert_reader<R: BufRead>(
        &self,
        reader: R,
        source: &Path,
    ) -> Result<Vec<Entry>, ConvertError> {
        let lines = reader
            .lines()
            .collect::<Result<Vec<String>, io::Error>>()
            .map_err(|source_err| ConvertError::Io {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        self.convert_lines(lines)
    }

    /// Parse (and optionally nest) the LDIF file at `path`.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Entry>, ConvertError> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading LDIF");
        let file = File::open(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.convert_reader(BufReader::new(file), path)
    }

    fn convert_lines<I, S>(&self, lines: I) -> Result<Vec<Entry>, ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = parse_with(lines, &self.config.parse.options())?;
        if !self.config.nest.enabled {
            return Ok(entries);
        }
        Ok(nest(entries, &self.config.nest.parent_attribute))
    }

    /// Serialize entries as a JSON array.
    pub fn to_json(&self, entries: &[Entry]) -> Result<String, ConvertError> {
        let mut buf = Vec::new();
        self.write_json(entries, &mut buf)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Serialize entries as a JSON array into `writer`.
    pub fn write_json<W: Write>(&self, entries: &[Entry], writer: W) -> Result<(), ConvertError> {
        let output = &self.config.output;
        if output.pretty {
            let indent = " ".repeat(output.indent);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = Serializer::with_formatter(writer, formatter);
            entries.serialize(&mut ser)?;
        } else {
            let mut ser = Serializer::new(writer);
            entries.serialize(&mut ser)?;
        }
        Ok(())
    }

    /// Convert `input` (a path, or stdin for `None` / `-`) and write the
    /// JSON document to `output` (a path, or stdout for `None`).
    ///
    /// Returns the number of top-level entries written.
    pub fn run(&self, input: Option<&Path>, output: Option<&Path>) -> Result<usize, ConvertError> {
        let entries = match input {
            Some(path) if path != Path::new(STDIN_PATH) => self.convert_file(path)?,
            _ => {
                let stdin = io::stdin();
                let mut text = String::new();
                stdin
                    .lock()
                    .read_to_string(&mut text)
                    .map_err(|source| ConvertError::Io {
                        path: PathBuf::from(STDIN_PATH),
                        source,
                    })?;
                self.convert_str(&text)?
            }
        };

        let mut document = self.to_json(&entries)?;
        document.push('\n');

        match output {
            Some(path) => {
                std::fs::write(path, document.as_bytes()).map_err(|source| ConvertError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), entries = entries.len(), "wrote JSON");
            }
            None => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(document.as_bytes())
                    .and_then(|()| lock.flush())
                    .map_err(|source| ConvertError::Io {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?;
                debug!(entries = entries.len(), "wrote JSON to stdout");
            }
        }

        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LdifError;

    const SAMPLE: &str = "dn: dc=test\nobjectClass: domain\n\ndn: ou=users,dc=test\nobjectClass: organizationalUnit\n";

    #[test]
    fn test_flat_conversion_by_default() {
        let converter = Converter::default();
        let entries = converter.convert_str(SAMPLE).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_nesting_enabled() {
        let mut config = ConvertConfig::default();
        config.nest.enabled = true;
        config.nest.parent_attribute = "children".into();
        let converter = Converter::new(config);

        let entries = converter.convert_str(SAMPLE).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains_key("children"));
    }

    #[test]
    fn test_compact_json() {
        let mut config = ConvertConfig::default();
        config.output.pretty = false;
        let converter = Converter::new(config);

        let entries = converter.convert_str("dn: o=org\nmail: a\nmail: b\n").unwrap();
        assert_eq!(
            converter.to_json(&entries).unwrap(),
            r#"[{"dn":"o=org","mail":["a","b"]}]"#
        );
    }

    #[test]
    fn test_pretty_json_indent() {
        let mut config = ConvertConfig::default();
        config.output.indent = 4;
        let converter = Converter::new(config);

        let entries = converter.convert_str("dn: o=org\n").unwrap();
        assert_eq!(
            converter.to_json(&entries).unwrap(),
            "[\n    {\n        \"dn\": \"o=org\"\n    }\n]"
        );
    }

    #[test]
    fn test_empty_input_is_empty_array() {
        let mut config = ConvertConfig::default();
        config.output.pretty = false;
        let converter = Converter::new(config);
        let entries = converter.convert_str("").unwrap();
        assert_eq!(converter.to_json(&entries).unwrap(), "[]");
    }

    #[test]
    fn test_parse_error_propagates() {
        let converter = Converter::default();
        let err = converter.convert_str("dn: o=org\nphoto:: %%%\n").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Ldif(LdifError::MalformedBase64 { .. })
        ));
    }

    #[test]
    fn test_convert_reader() {
        let converter = Converter::default();
        let reader = io::Cursor::new(SAMPLE.as_bytes());
        let entries = converter
            .convert_reader(reader, Path::new("sample.ldif"))
            .unwrap();
        assert_eq!(entries[1].dn(), Some("ou=users,dc=test"));
    }

    #[test]
    fn test_convert_missing_file() {
        let converter = Converter::default();
        let err = converter.convert_file("/nonexistent/input.ldif").unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn test_run_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.ldif");
        let output = dir.path().join("out.json");
        std::fs::write(&input, SAMPLE).unwrap();

        let mut config = ConvertConfig::default();
        config.nest.enabled = true;
        let written = Converter::new(config)
            .run(Some(input.as_path()), Some(output.as_path()))
            .unwrap();
        assert_eq!(written, 1);

        let json = std::fs::read_to_string(&output).unwrap();
        assert!(json.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["subEntries"][0]["dn"], "ou=users,dc=test");
    }
}
