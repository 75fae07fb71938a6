//! User-facing event side channel.
//!
//! Every operation that can produce a milestone takes `&mut EventLog` and
//! appends to it; the caller decides how to deliver the events. Diagnostic
//! output goes through `tracing` instead.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    System,
    Info,
    Warning,
    Success,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    /// Wall-clock time, `HH:MM:SS`
    pub time: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

impl LogEvent {
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            severity,
            message: message.into(),
        }
    }
}

/// Ordered events produced while handling one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<LogEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let event = LogEvent::now(severity, message);
        tracing::debug!("event {:?}: {}", event.severity, event.message);
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter()
    }

    /// Take every event out, leaving the log empty
    pub fn drain(&mut self) -> Vec<LogEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn contains(&self, severity: Severity, message: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.severity == severity && e.message == message)
    }
}
