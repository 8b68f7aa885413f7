//! Intake agent: records contact details and the matter for a new client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::parse_input;
use crate::records::{IntakeRecord, RecordStore, Urgency};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeInput {
    pub client_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub matter_description: String,
    #[serde(default)]
    pub matter_type: Option<String>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

pub struct IntakeAgentTool {
    definition: ToolDefinition,
    records: Arc<dyn RecordStore>,
}

impl IntakeAgentTool {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        let definition = ToolDefinition::new(
            "intakeAgent",
            "Create or update a client intake record, including contact details, matter \
             description, and basic tags (matter type, urgency).",
            InputSchema::new()
                .required_string("clientName", "Client full name")
                .required_string("email", "Client email address")
                .optional_string("phone", "Client phone number")
                .required_string("matterDescription", "Free-text description of the legal issue")
                .optional_string(
                    "matterType",
                    "Short label for matter type, e.g. 'family', 'immigration', 'business contracts'",
                )
                .optional_enum(
                    "urgency",
                    &["low", "medium", "high"],
                    "Rough urgency level based on deadlines or language used",
                ),
        );
        Self {
            definition,
            records,
        }
    }
}

#[async_trait]
impl Tool for IntakeAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: IntakeInput = parse_input(args)?;
        let record = self
            .records
            .create_intake(IntakeRecord {
                id: Uuid::new_v4().to_string(),
                client_name: input.client_name,
                email: input.email,
                phone: input.phone,
                matter_description: input.matter_description,
                matter_type: input.matter_type,
                urgency: input.urgency,
                created_at: Utc::now(),
            })
            .await?;
        info!(intake_id = %record.id, "Intake record created");

        Ok(format!(
            "Intake record created with id {} for {}. Matter type: {}, urgency: {}.",
            record.id,
            record.client_name,
            record.matter_type.as_deref().unwrap_or("unspecified"),
            record
                .urgency
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unspecified".to_string()),
        ))
    }
}
