//! Line-level LDIF parser.
//!
//! Raw lines are first folded into logical lines (a line starting with a
//! single space continues the previous one), then each logical line is
//! classified as a record terminator, a comment, or an attribute line.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, trace, warn};

use crate::errors::LdifError;
use crate::models::Entry;

/// Marker kept in front of undecoded Base64 payloads.
const BASE64_MARKER: &str = "::";

/// Parser switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Decode `name:: payload` values instead of keeping the raw payload.
    pub decode_base64: bool,
    /// Log and skip malformed lines instead of failing the whole parse.
    pub lenient: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            decode_base64: true,
            lenient: false,
        }
    }
}

/// Parse raw LDIF lines into entries, in file order.
pub fn parse<I, S>(lines: I, decode_base64: bool) -> Result<Vec<Entry>, LdifError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_with(
        lines,
        &ParseOptions {
            decode_base64,
            ..ParseOptions::default()
        },
    )
}

/// Parse a whole LDIF document held in memory.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Vec<Entry>, LdifError> {
    parse_with(text.lines(), options)
}

/// Parse raw LDIF lines with explicit options.
///
/// Trailing `\n` / `\r\n` are stripped from every line before processing.
pub fn parse_with<I, S>(lines: I, options: &ParseOptions) -> Result<Vec<Entry>, LdifError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = RecordBuilder::new(*options);
    let mut pending: Option<LogicalLine> = None;
    let mut physical = 0usize;

    for (idx, raw) in lines.into_iter().enumerate() {
        physical = idx + 1;
        let line = strip_line_ending(raw.as_ref());

        if let Some(rest) = line.strip_prefix(' ') {
            match pending.as_mut() {
                Some(open) if !open.is_blank() => {
                    open.text.push_str(rest);
                    continue;
                }
                _ => {
                    // Nothing to continue; treat the remainder as its own line.
                    if let Some(done) = pending.take() {
                        builder.feed(done)?;
                    }
                    pending = Some(LogicalLine::new(physical, rest));
                    continue;
                }
            }
        }

        if let Some(done) = pending.take() {
            builder.feed(done)?;
        }
        pending = Some(LogicalLine::new(physical, line));
    }

    if let Some(done) = pending.take() {
        builder.feed(done)?;
    }

    let entries = builder.finish();
    debug!(
        lines = physical,
        entries = entries.len(),
        decode_base64 = options.decode_base64,
        "parsed LDIF"
    );
    Ok(entries)
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

// ---------------------------------------------------------------------------
// Logical lines
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LogicalLine {
    /// 1-based physical line the logical line starts on.
    line: usize,
    text: String,
}

impl LogicalLine {
    fn new(line: usize, text: &str) -> Self {
        Self {
            line,
            text: text.to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Record assembly
// ---------------------------------------------------------------------------

struct RecordBuilder {
    options: ParseOptions,
    entries: Vec<Entry>,
    current: Entry,
}

impl RecordBuilder {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
            current: Entry::new(),
        }
    }

    fn feed(&mut self, logical: LogicalLine) -> Result<(), LdifError> {
        match self.apply(&logical) {
            Ok(()) => Ok(()),
            Err(e) if self.options.lenient => {
                warn!(error = %e, "skipping malformed LDIF line");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn apply(&mut self, logical: &LogicalLine) -> Result<(), LdifError> {
        let text = logical.text.as_str();

        if logical.is_blank() {
            self.flush();
            return Ok(());
        }
        if text.starts_with('#') {
            trace!(line = logical.line, "skipping comment");
            return Ok(());
        }

        let record = self.entries.len();
        let Some(sep) = text.find(':') else {
            return Err(LdifError::MissingSeparator {
                record,
                line: logical.line,
                content: text.to_string(),
            });
        };

        let name = &text[..sep];
        let rest = &text[sep + 1..];

        let value = match rest.strip_prefix(':') {
            Some(encoded) => {
                let payload = encoded.trim_start();
                if self.options.decode_base64 {
                    decode_value(name, payload, record, logical.line)?
                } else {
                    format!("{BASE64_MARKER} {payload}")
                }
            }
            None => rest.strip_prefix(' ').unwrap_or(rest).to_string(),
        };

        self.current.add_value(name, value);
        Ok(())
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.entries.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Entry> {
        self.flush();
        self.entries
    }
}

fn decode_value(
    attribute: &str,
    payload: &str,
    record: usize,
    line: usize,
) -> Result<String, LdifError> {
    let bytes = STANDARD
        .decode(payload.trim_end())
        .map_err(|source| LdifError::MalformedBase64 {
            attribute: attribute.to_string(),
            record,
            line,
            source,
        })?;
    String::from_utf8(bytes).map_err(|_| LdifError::InvalidUtf8 {
        attribute: attribute.to_string(),
        record,
        line,
    })
}
