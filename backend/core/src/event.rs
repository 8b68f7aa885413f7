use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::ToolResult;

/// Why a dispatch run ended normally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model answered without requesting further tools.
    Completed,
    /// The model kept requesting tools after the step budget was spent.
    StepBudgetExhausted,
    /// The client went away; no further model round trips were made.
    Cancelled,
}

/// Incremental output of a dispatch run, in emission order.
///
/// A run emits exactly one terminal event: `Finish` or `Error`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum LoopEvent {
    /// A fragment of assistant text.
    TextDelta { delta: String },
    /// The model requested a tool.
    ToolCall {
        call_id: String,
        tool_name: String,
        args: Value,
    },
    /// Progress or outcome of a tool invocation.
    ToolResult(ToolResult),
    /// The run reached `done`.
    Finish {
        reason: FinishReason,
        steps: usize,
        text: String,
    },
    /// The run reached `failed`.
    Error { message: String },
}

impl LoopEvent {
    /// Wire name of the event (used as the SSE event field).
    pub fn kind(&self) -> &'static str {
        match self {
            LoopEvent::TextDelta { .. } => "text-delta",
            LoopEvent::ToolCall { .. } => "tool-call",
            LoopEvent::ToolResult(_) => "tool-result",
            LoopEvent::Finish { .. } => "finish",
            LoopEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopEvent::Finish { .. } | LoopEvent::Error { .. })
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ToolCall, ToolResult};
    use serde_json::json;

    #[test]
    fn tool_result_event_serializes_flat() {
        let call = ToolCall::new("call_7", "emailAgent", json!({}));
        let event = LoopEvent::ToolResult(ToolResult::complete(&call, "sent"));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "tool-result");
        assert_eq!(value["callId"], "call_7");
        assert_eq!(value["state"], "complete");
        assert_eq!(event.kind(), "tool-result");
    }

    #[test]
    fn finish_event_uses_camel_case_fields() {
        let event = LoopEvent::Finish {
            reason: FinishReason::StepBudgetExhausted,
            steps: 3,
            text: "partial".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["reason"], "step_budget_exhausted");
        assert_eq!(value["steps"], 3);
        assert!(event.is_terminal());
    }

    #[test]
    fn finish_reason_display() {
        assert_eq!(FinishReason::Completed.to_string(), "completed");
        assert_eq!(FinishReason::Cancelled.to_string(), "cancelled");
    }
}
