mod json_lines;

pub use json_lines::JsonLinesSink;

use anyhow::Result;

use crate::events::LogEvent;
use crate::session::GestureRecord;

/// Trait for record destinations
pub trait RecordSink {
    /// Write one per-frame record
    fn write_record(&mut self, record: &GestureRecord) -> Result<()>;

    /// Write user-facing events, in order
    fn write_events(&mut self, events: &[LogEvent]) -> Result<()>;
}
