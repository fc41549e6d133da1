use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};

use crate::providers::TranscriptSegment;

/// Body printed when anything goes wrong
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub error: String,
}

/// `serde_json` formatter producing the same text as Python's `json.dumps`
/// with default arguments: `", "` and `": "` separators, non-ASCII and DEL escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonFormatter;

impl serde_json::ser::Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if fragment.bytes().all(|b| b < 0x7f) {
            return writer.write_all(fragment.as_bytes());
        }

        // DEL is escaped like everything outside printable ASCII
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() && c != '\u{7f}' {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize any value as a single JSON document
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PythonFormatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON output")?;

    // The formatter only ever emits ASCII
    String::from_utf8(buf).context("JSON output was not valid UTF-8")
}

/// Render a successful fetch
pub fn render_segments(segments: &[TranscriptSegment]) -> Result<String> {
    to_json(segments)
}

/// Render an error object. Never fails.
pub fn render_error(message: &str) -> String {
    let result = ErrorResult {
        error: message.to_string(),
    };
    to_json(&result).unwrap_or_else(|_| r#"{"error": "Failed to serialize error"}"#.to_string())
}

/// Flatten an error and its causes into one line of text
pub fn error_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}

/// Print a rendered document to stdout
pub fn print_to_console(document: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", document)?;
    handle.flush()?;
    Ok(())
}
