//! Scan Event Logger
//!
//! Structured events for each step of a scan session, emitted through
//! `tracing` under the `scan_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    LabelAnalyzed {
        source: String,
        provider: String,
        chars: usize,
    },
    AnalysisFailed {
        source: String,
        error_msg: String,
    },
    RecordExtracted {
        brand: String,
        defaulted_fields: usize,
    },
    LedgerUpdated {
        position: usize,
        count: u64,
        inserted: bool,
    },
    SnapshotExported {
        path: String,
        entries: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ScanEvent,
}

impl EventLogEntry {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub struct ScanEventLogger;

impl ScanEventLogger {
    /// Build the log entry for `event`, redacting free-text fields.
    pub fn entry(session_id: &str, mut event: ScanEvent) -> EventLogEntry {
        if let ScanEvent::AnalysisFailed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Emit a scan event for `session_id`.
    pub fn log_event(session_id: &str, event: ScanEvent) {
        let entry = Self::entry(session_id, event);
        info!(target: "scan_events", event = %entry.to_json(), "Scan event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = ScanEventLogger::entry(
            "s1",
            ScanEvent::AnalysisFailed {
                source: "a.jpg".into(),
                error_msg: "HTTP 401 for Bearer abc.def.ghi".into(),
            },
        );
        let json = entry.to_json();
        assert!(json.contains("\"type\":\"analysis_failed\""));
        assert!(!json.contains("abc.def.ghi"));
    }

    #[test]
    fn serializes_ledger_update() {
        let entry = ScanEventLogger::entry(
            "s1",
            ScanEvent::LedgerUpdated { position: 0, count: 2, inserted: false },
        );
        let value: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(value["event"]["count"], 2);
        assert_eq!(value["session_id"], "s1");
    }
}
