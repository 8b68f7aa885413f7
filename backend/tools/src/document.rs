//! Document agent: drafts intake summaries, follow-up emails and engagement
//! letters. Drafts are returned as text; nothing is sent from here.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::firm::FirmProfile;
use crate::parse_input;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DocumentMode {
    IntakeSummary,
    ConsultFollowupEmail,
    EngagementLetter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub mode: DocumentMode,
    pub client_name: String,
    pub matter_description: String,
    #[serde(default)]
    pub appointment_date_time: Option<String>,
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

pub struct DocumentAgentTool {
    definition: ToolDefinition,
    firm: FirmProfile,
}

impl DocumentAgentTool {
    pub fn new(firm: FirmProfile) -> Self {
        let definition = ToolDefinition::new(
            "documentAgent",
            "Draft structured documents based on existing client and matter information: \
             intake summaries for lawyers, follow-up emails, and simple engagement templates.",
            InputSchema::new()
                .required_enum(
                    "mode",
                    &["intakeSummary", "consultFollowupEmail", "engagementLetter"],
                    "Type of document to draft",
                )
                .required_string("clientName", "Client name to personalize the document")
                .required_string(
                    "matterDescription",
                    "Key facts and context about the client's matter to include in the draft",
                )
                .optional_string(
                    "appointmentDateTime",
                    "ISO date/time string for the consultation, if relevant",
                )
                .optional_string(
                    "extraInstructions",
                    "Any extra instructions from the lawyer or firm regarding tone or content",
                ),
        );
        Self { definition, firm }
    }

    pub fn draft(&self, input: &DocumentInput) -> String {
        let name = &input.client_name;
        let matter = &input.matter_description;
        match input.mode {
            DocumentMode::IntakeSummary => format!(
                "Intake Summary for {name}\n\nKey Facts:\n{matter}\n\nConsultation:\n{}\n\n\
                 Lawyer Prep Checklist:\n\
                 - Review any prior related matters for this client (if any).\n\
                 - Identify key documents to request.\n\
                 - Prepare 3–5 targeted questions to clarify the goals and constraints.\n\n{}",
                input
                    .appointment_date_time
                    .as_deref()
                    .unwrap_or("Not yet scheduled."),
                input.extra_instructions.as_deref().unwrap_or_default(),
            ),
            DocumentMode::ConsultFollowupEmail => format!(
                "Subject: Thank you for meeting with us, {name}\n\nDear {name},\n\n\
                 Thank you for taking the time to speak with us{}.\n\n\
                 Based on our discussion, here is a brief summary of your matter:\n{matter}\n\n\
                 Next Steps:\n\
                 - We will review the information and documents you've provided.\n\
                 - We will follow up with any additional questions or documents needed.\n\
                 - If you decide to move forward, we will send you our engagement letter for review.\n\n{}",
                input
                    .appointment_date_time
                    .as_deref()
                    .map(|w| format!(" on {w}"))
                    .unwrap_or_default(),
                input
                    .extra_instructions
                    .clone()
                    .unwrap_or_else(|| self.firm.sign_off("Best regards")),
            ),
            DocumentMode::EngagementLetter => format!(
                "Subject: Engagement Letter for {name}\n\nDear {name},\n\n\
                 Thank you for considering our firm to assist you with the following matter:\n{matter}\n\n\
                 This letter outlines the scope of our representation, our fees, and other important terms.\n\
                 [INSERT FIRM-SPECIFIC TERMS HERE]\n\n\
                 If these terms are acceptable, please sign and return this letter so we may begin work on your matter.\n\n{}",
                input
                    .extra_instructions
                    .clone()
                    .unwrap_or_else(|| self.firm.sign_off("Sincerely")),
            ),
        }
    }
}

#[async_trait]
impl Tool for DocumentAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: DocumentInput = parse_input(args)?;
        Ok(self.draft(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn summary_defaults_to_unscheduled() {
        let tool = DocumentAgentTool::new(FirmProfile::default());
        let out = tool
            .execute(json!({
                "mode": "intakeSummary",
                "clientName": "John Doe",
                "matterDescription": "Deposit dispute"
            }))
            .await
            .unwrap();
        assert!(out.starts_with("Intake Summary for John Doe"));
        assert!(out.contains("Consultation:\nNot yet scheduled."));
    }

    #[tokio::test]
    async fn letters_close_with_firm_name_unless_instructed() {
        let firm = FirmProfile {
            name: "Harbor & Pine LLP".into(),
            ..FirmProfile::default()
        };
        let tool = DocumentAgentTool::new(firm);
        let out = tool
            .execute(json!({
                "mode": "engagementLetter",
                "clientName": "Jane Roe",
                "matterDescription": "Trademark filing"
            }))
            .await
            .unwrap();
        assert!(out.ends_with("Sincerely,\nHarbor & Pine LLP"));

        let out = tool
            .execute(json!({
                "mode": "consultFollowupEmail",
                "clientName": "Jane Roe",
                "matterDescription": "Trademark filing",
                "appointmentDateTime": "Oct 20",
                "extraInstructions": "Warmly,\nJ. Pine"
            }))
            .await
            .unwrap();
        assert!(out.contains("speak with us on Oct 20."));
        assert!(out.ends_with("Warmly,\nJ. Pine"));
    }
}
