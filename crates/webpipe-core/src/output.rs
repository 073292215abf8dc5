//! Machine-readable run reports.
//!
//! Per-file [`TranscodeResult`](crate::types::TranscodeResult) records and
//! the final [`RunReport`](crate::types::RunReport) can be streamed as JSON
//! Lines while a run progresses, or collected into one JSON array.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON document (an array when writing several records)
    Json,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    /// Parse a format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Guess the format from a report file's extension; JSON Lines unless
    /// the file ends in `.json`.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::JsonLines,
        }
    }
}

/// Serializes records to JSON or JSON Lines.
///
/// In [`OutputFormat::Json`] mode single records are buffered and written as
/// one array by [`OutputWriter::finish`], so the file stays a valid document.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<serde_json::Value>,
    records_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects [`OutputFormat::Json`].
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            records_written: 0,
        }
    }

    /// Write (or, for JSON, queue) one record.
    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::to_value(record).map_err(io::Error::other)?;
                self.pending.push(value);
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                // Keep the report readable while a long run is still going.
                self.writer.flush()?;
            }
        }
        self.records_written += 1;
        Ok(())
    }

    /// Number of records accepted so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Emit any buffered records and flush. Returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            let pending = std::mem::take(&mut self.pending);
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &pending)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &pending).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Serialize a value to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}
