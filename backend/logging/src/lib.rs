//! Structured logging for ShelfScan.
//!
//! Handles subscriber setup, log redaction, and per-session scan events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, ScanEvent, ScanEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
