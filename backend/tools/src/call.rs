//! Call agent: starts outbound phone workflows through the voice agent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::parse_input;
use crate::voice::{OutboundCall, VoiceAgentProvider};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CallReason {
    ScheduleConsultation,
    ConfirmAppointment,
    GeneralCallback,
}

impl CallReason {
    fn describe(self) -> &'static str {
        match self {
            CallReason::ScheduleConsultation => "to schedule a consultation",
            CallReason::ConfirmAppointment => "to confirm an upcoming appointment",
            CallReason::GeneralCallback => "for a general callback",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInput {
    pub client_name: String,
    pub phone_number: String,
    pub reason: CallReason,
    #[serde(default)]
    pub notes_for_agent: Option<String>,
}

pub struct CallAgentTool {
    definition: ToolDefinition,
    voice: Arc<dyn VoiceAgentProvider>,
}

impl CallAgentTool {
    pub fn new(voice: Arc<dyn VoiceAgentProvider>) -> Self {
        let definition = ToolDefinition::new(
            "callAgent",
            "Initiate or describe phone call workflows (handled by the voice agent or staff) \
             for after-hours answering or follow-up calls.",
            InputSchema::new()
                .required_string("clientName", "Client name")
                .required_string(
                    "phoneNumber",
                    "Client phone number, ideally in E.164 format, e.g. +1XXXXXXXXXX",
                )
                .required_enum(
                    "reason",
                    &["scheduleConsultation", "confirmAppointment", "generalCallback"],
                    "Reason for the call",
                )
                .optional_string(
                    "notesForAgent",
                    "Short context for the phone agent, e.g. intake ID, matter type, or priority.",
                ),
        );
        Self { definition, voice }
    }
}

#[async_trait]
impl Tool for CallAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: CallInput = parse_input(args)?;
        let reason = input.reason.describe();
        let call_id = self
            .voice
            .start_outbound_call(OutboundCall {
                client_name: input.client_name.clone(),
                phone_number: input.phone_number.clone(),
                reason: reason.to_string(),
                notes: input.notes_for_agent.clone(),
            })
            .await?;
        info!(call_id = %call_id, reason = ?input.reason, "Outbound call requested");

        let mut out = format!(
            "Outbound call workflow started for {} at {} {reason}.",
            input.client_name, input.phone_number
        );
        if let Some(notes) = &input.notes_for_agent {
            out.push_str(&format!(" Notes for the phone agent: {notes}"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::SimulatedVoiceAgent;
    use serde_json::json;

    #[tokio::test]
    async fn starts_a_call_with_reason_text() {
        let voice = Arc::new(SimulatedVoiceAgent::new());
        let tool = CallAgentTool::new(voice.clone());
        let out = tool
            .execute(json!({
                "clientName": "John Doe",
                "phoneNumber": "+15555550100",
                "reason": "confirmAppointment",
                "notesForAgent": "intake 42"
            }))
            .await
            .unwrap();
        assert_eq!(
            out,
            "Outbound call workflow started for John Doe at +15555550100 to confirm an \
             upcoming appointment. Notes for the phone agent: intake 42"
        );
        assert_eq!(voice.calls().await.len(), 1);
    }
}
