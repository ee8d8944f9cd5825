//! JSON and JSON Lines writers for batch results and object listings.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON document
    #[default]
    Json,
    /// One JSON object per line
    JsonLines,
}

/// Serializes values onto any [`Write`] sink.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only applies to [`OutputFormat::Json`].
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write one value followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write a sequence: a JSON array, or one line per element.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(&items),
            OutputFormat::JsonLines => items.iter().try_for_each(|item| self.write(item)),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectInfo;
    use crate::types::BatchResult;

    fn objects() -> Vec<ObjectInfo> {
        vec![
            ObjectInfo {
                key: "1_a.jpg".to_string(),
                size: 10,
                modified_at: Some(1_700_000_000),
            },
            ObjectInfo {
                key: "2_b.jpg".to_string(),
                size: 20,
                modified_at: None,
            },
        ]
    }

    #[test]
    fn test_batch_result_as_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write(&BatchResult::partial(
                vec!["https://cdn/1_a.jpg".to_string(), String::new()],
                1,
                "Read error for b.png: gone",
            ))
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains(r#""success":false"#));
        assert!(output.contains(r#""links":["https://cdn/1_a.jpg",""]"#));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_listing_as_json_lines() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_all(&objects()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""modified_at":1700000000"#));
        assert!(!lines[1].contains("modified_at"));
    }

    #[test]
    fn test_listing_as_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&objects()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim_end().ends_with(']'));
    }
}
