//! Structured logging for LexDesk.
//!
//! Console plus rolling NDJSON file output, redaction of client contact
//! details and credentials, and the dispatch event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{DispatchEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
