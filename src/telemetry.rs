//! Telemetry module for the replace engine
//!
//! Diagnostics go two ways: a structured JSON line through the `log`
//! facade, and a human-readable line to the optional [`Logger`]
//! collaborator handed in by the caller. Neither affects control flow.

use log::{debug, warn};
use serde::Serialize;

/// Text sink for user-facing diagnostics
pub trait Logger {
    /// Log one line of text. Returns false if the text could not be delivered.
    fn log(&mut self, text: &str) -> bool;
}

/// Logger that forwards to `log::info!`
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&mut self, text: &str) -> bool {
        log::info!("{}", text.trim_end());
        true
    }
}

/// Captures lines in memory
impl Logger for Vec<String> {
    fn log(&mut self, text: &str) -> bool {
        self.push(text.trim_end().to_string());
        true
    }
}

/// Event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Occurrence replaced
    Replaced,
    /// Occurrence found (dry run)
    Found,
    /// Matching stopped after the first occurrence
    StoppedAfterFirst,
    /// Final count
    Summary,
    /// The sink failed
    WriteFailed,
    /// The source failed
    ReadFailed,
    /// Cancelled through the abort flag
    Aborted,
}

/// Diagnostic event for one pass
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceEvent {
    /// Event type
    pub event_type: EventType,
    /// Offset of the match start in the matched stream
    ///
    /// This is the first matched byte, not the last one, counted after
    /// line break normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Number of occurrences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Whether the pass is a dry run
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    /// Reason for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReplaceEvent {
    /// Create a new event
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            offset: None,
            count: None,
            dry_run: false,
            reason: None,
        }
    }

    /// Set the match offset
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the occurrence count
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Mark as a dry-run event
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the failure reason
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Human-readable line for the caller's logger
    pub fn message(&self) -> String {
        match self.event_type {
            EventType::Replaced => {
                format!("Replaced occurrence at offset: 0x{:016X}", self.offset.unwrap_or(0))
            }
            EventType::Found => {
                format!("Found occurrence at offset: 0x{:016X}", self.offset.unwrap_or(0))
            }
            EventType::StoppedAfterFirst => {
                "Stopping search & replace after *first* match.".to_string()
            }
            EventType::Summary => {
                let verb = if self.dry_run { "found" } else { "replaced" };
                format!("Total occurrences {}: {}", verb, self.count.unwrap_or(0))
            }
            EventType::WriteFailed => "Write operation failed -> aborting!".to_string(),
            EventType::ReadFailed => "Read operation failed -> aborting!".to_string(),
            EventType::Aborted => "Process cancelled by user --> aborting!".to_string(),
        }
    }

    /// Emit the event
    pub fn emit(&self, logger: &mut Option<&mut dyn Logger>) {
        match serde_json::to_string(self) {
            Ok(json) => match self.event_type {
                EventType::WriteFailed | EventType::ReadFailed => {
                    warn!("[REPLACE] {}", json);
                }
                _ => {
                    debug!("[REPLACE] {}", json);
                }
            },
            Err(e) => {
                warn!("Failed to serialize replace event: {}", e);
            }
        }

        if let Some(logger) = logger.as_deref_mut() {
            if !logger.log(&self.message()) {
                debug!("logger rejected {:?} message", self.event_type);
            }
        }
    }
}

/// Create a match event, `Found` for dry runs
pub fn event_match(offset: u64, dry_run: bool) -> ReplaceEvent {
    let event_type = if dry_run {
        EventType::Found
    } else {
        EventType::Replaced
    };
    ReplaceEvent::new(event_type)
        .with_offset(offset)
        .with_dry_run(dry_run)
}

/// Create a summary event
pub fn event_summary(count: u64, dry_run: bool) -> ReplaceEvent {
    ReplaceEvent::new(EventType::Summary)
        .with_count(count)
        .with_dry_run(dry_run)
}

/// Create a failure event
pub fn event_failure(event_type: EventType, reason: &str) -> ReplaceEvent {
    ReplaceEvent::new(event_type).with_reason(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = event_match(0x10, false);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"replaced\""));
        assert!(json.contains("\"offset\":16"));
        assert!(!json.contains("dry_run"));
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            event_match(0x1F, true).message(),
            "Found occurrence at offset: 0x000000000000001F"
        );
        assert_eq!(event_summary(3, false).message(), "Total occurrences replaced: 3");
        assert_eq!(event_summary(2, true).message(), "Total occurrences found: 2");
        assert_eq!(
            ReplaceEvent::new(EventType::Aborted).message(),
            "Process cancelled by user --> aborting!"
        );
    }

    #[test]
    fn test_emit_to_capturing_logger() {
        let mut lines: Vec<String> = Vec::new();
        {
            let mut logger: Option<&mut dyn Logger> = Some(&mut lines);
            event_failure(EventType::WriteFailed, "disk full").emit(&mut logger);
            event_summary(1, false).emit(&mut logger);
        }
        assert_eq!(
            lines,
            vec![
                "Write operation failed -> aborting!".to_string(),
                "Total occurrences replaced: 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_emit_without_logger() {
        let mut logger: Option<&mut dyn Logger> = None;
        event_summary(0, false).emit(&mut logger);
    }

    #[test]
    fn test_log_facade_accepts() {
        let mut facade = LogFacade;
        let mut logger: Option<&mut dyn Logger> = Some(&mut facade);
        event_match(4, true).emit(&mut logger);
        assert!(facade.log("plain line\n"));
    }
}
