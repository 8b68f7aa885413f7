//! Dispatch Event Logger
//!
//! Model turns, tool calls and run outcomes written through `tracing` under
//! the `dispatch_events` target, so they land in the rolling NDJSON log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DispatchEvent {
    ModelTurn {
        step: usize,
        provider: String,
    },
    ToolCall {
        call_id: String,
        tool_name: String,
        arguments_json: String,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        state: String,
        payload: String,
    },
    RunFinished {
        reason: String,
        steps: usize,
    },
    RunFailed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: DispatchEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact free-text fields, then emit the event.
    pub fn log_event(run_id: &str, event: DispatchEvent) {
        let entry = EventLogEntry {
            run_id: run_id.into(),
            timestamp: Utc::now(),
            event: Self::redacted(event),
        };
        let json = serde_json::to_string(&entry).unwrap_or_else(|e| e.to_string());
        info!(target: "dispatch_events", run_id = %entry.run_id, event = %json, "Dispatch event");
    }

    fn redacted(mut event: DispatchEvent) -> DispatchEvent {
        match &mut event {
            DispatchEvent::ToolCall { arguments_json, .. } => {
                *arguments_json = redact_sensitive_data(arguments_json);
            }
            DispatchEvent::ToolResult { payload, .. } => {
                *payload = redact_sensitive_data(payload);
            }
            DispatchEvent::RunFailed { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            DispatchEvent::ModelTurn { .. } | DispatchEvent::RunFinished { .. } => {}
        }
        event
    }
}
