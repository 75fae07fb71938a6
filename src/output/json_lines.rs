use super::RecordSink;
use crate::events::LogEvent;
use crate::session::GestureRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;

/// Writes records and events as one JSON object per line
///
/// Events carry a `type` key and records a `gesture` key, so a reader can
/// tell them apart without an envelope.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines: u64,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Writing records to {}", path.display());

        let file = File::create(path)
            .with_context(|| format!("Failed to create output file at {}", path.display()))?;

        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value).context("Failed to serialize line")?;
        self.writer
            .write_all(b"\n")
            .context("Failed to write line")?;
        self.lines += 1;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &GestureRecord) -> Result<()> {
        self.write_line(record)?;
        self.writer.flush().context("Failed to flush output")
    }

    fn write_events(&mut self, events: &[LogEvent]) -> Result<()> {
        for event in events {
            self.write_line(event)?;
        }
        self.writer.flush().context("Failed to flush output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Severity;
    use crate::session::Mode;

    #[test]
    fn test_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_events(&[LogEvent::now(Severity::System, "Backend Loaded. Ready.")])
            .unwrap();
        sink.write_record(&GestureRecord::no_hand(Mode::Manual))
            .unwrap();
        assert_eq!(sink.lines(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "SYSTEM");
        assert_eq!(lines[0]["message"], "Backend Loaded. Ready.");
        assert_eq!(lines[1]["gesture"], "NONE");
        assert_eq!(lines[1]["mode"], "MANUAL");
    }

    #[test]
    fn test_no_events_writes_nothing() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_events(&[]).unwrap();
        assert!(sink.into_inner().is_empty());
    }
}
