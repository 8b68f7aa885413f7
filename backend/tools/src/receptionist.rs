//! Receptionist: greets visitors and routes them to the specialist tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::{parse_input, Latency};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReceptionAction {
    Greet,
    Route,
    Summarize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionistInput {
    pub client_name: String,
    pub inquiry: String,
    pub action: ReceptionAction,
}

pub struct ReceptionistTool {
    definition: ToolDefinition,
    latency: Latency,
}

impl ReceptionistTool {
    pub fn new(latency: Latency) -> Self {
        let definition = ToolDefinition::new(
            "receptionist",
            "Handle initial client interactions and coordinate with other agents. \
             Route inquiries about client records to the portfolio manager, scheduling \
             questions to the calendar agent, and communication needs to the email agent.",
            InputSchema::new()
                .required_string("clientName", "The client name")
                .required_string("inquiry", "The nature of the inquiry")
                .required_enum("action", &["greet", "route", "summarize"], "Action to take"),
        );
        Self { definition, latency }
    }
}

pub fn respond(input: &ReceptionistInput) -> String {
    match input.action {
        ReceptionAction::Greet => format!(
            "Welcome {}! I'm the receptionist agent. I understand you're inquiring about: {}. \
             Let me coordinate with the appropriate specialists to assist you.",
            input.client_name, input.inquiry
        ),
        ReceptionAction::Route => format!(
            "Routing {}'s inquiry regarding \"{}\" to the appropriate specialized agents...",
            input.client_name, input.inquiry
        ),
        ReceptionAction::Summarize => format!(
            "Summary prepared for {}: All relevant agents have been consulted and your matter \
             has been handled comprehensively.",
            input.client_name
        ),
    }
}

#[async_trait]
impl Tool for ReceptionistTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: ReceptionistInput = parse_input(args)?;
        debug!(client = %input.client_name, action = ?input.action, "Receptionist handling inquiry");
        self.latency.pause(500).await;
        Ok(respond(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn greets_by_name() {
        let tool = ReceptionistTool::new(Latency(false));
        let out = tool
            .execute(json!({"clientName": "Ada", "inquiry": "a lease dispute", "action": "greet"}))
            .await
            .unwrap();
        assert!(out.starts_with("Welcome Ada!"));
        assert!(out.contains("a lease dispute"));
    }

    #[tokio::test]
    async fn route_quotes_the_inquiry() {
        let tool = ReceptionistTool::new(Latency(false));
        let out = tool
            .execute(json!({"clientName": "Ada", "inquiry": "reschedule", "action": "route"}))
            .await
            .unwrap();
        assert!(out.contains("\"reschedule\""));
    }
}
