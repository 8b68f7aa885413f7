//! Email agent: confirmations, reminders, after-hours receipts and updates.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::firm::FirmProfile;
use crate::{parse_input, Latency};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    pub message_id: String,
    pub email: OutgoingEmail,
    pub sent_at: DateTime<Utc>,
}

/// Outbound mail provider (SendGrid, SES and the like).
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send the message and return the provider's message id.
    async fn send(&self, email: OutgoingEmail) -> Result<String>;
}

/// Keeps "sent" mail in memory.
pub struct SimulatedMailer {
    outbox: Arc<RwLock<Vec<SentEmail>>>,
}

impl SimulatedMailer {
    pub fn new() -> Self {
        Self {
            outbox: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.outbox.read().await.clone()
    }
}

impl Default for SimulatedMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for SimulatedMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<String> {
        let message_id = format!("msg_{}", Uuid::new_v4().simple());
        self.outbox.write().await.push(SentEmail {
            message_id: message_id.clone(),
            email,
            sent_at: Utc::now(),
        });
        Ok(message_id)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EmailScenario {
    IntakeConfirmation,
    ConsultReminder,
    AfterHoursReceipt,
    GenericUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailInput {
    pub scenario: EmailScenario,
    pub recipient_email: String,
    pub client_name: String,
    #[serde(default)]
    pub appointment_date_time: Option<String>,
    #[serde(default)]
    pub office_location_or_link: Option<String>,
    #[serde(default)]
    pub custom_subject: Option<String>,
    #[serde(default)]
    pub custom_body: Option<String>,
}

pub struct EmailAgentTool {
    definition: ToolDefinition,
    mailer: Arc<dyn EmailProvider>,
    firm: FirmProfile,
    latency: Latency,
}

impl EmailAgentTool {
    pub fn new(mailer: Arc<dyn EmailProvider>, firm: FirmProfile, latency: Latency) -> Self {
        let definition = ToolDefinition::new(
            "emailAgent",
            "Handle outgoing client emails for confirmations, reminders, after-hours \
             acknowledgements, and general updates. Drafts and sends emails via the firm's \
             email provider.",
            InputSchema::new()
                .required_enum(
                    "scenario",
                    &[
                        "intakeConfirmation",
                        "consultReminder",
                        "afterHoursReceipt",
                        "genericUpdate",
                    ],
                    "Email scenario to handle",
                )
                .required_string("recipientEmail", "Client email address")
                .required_string("clientName", "Client name for personalization")
                .optional_string(
                    "appointmentDateTime",
                    "ISO date/time string of the consultation when relevant.",
                )
                .optional_string(
                    "officeLocationOrLink",
                    "Office address or video link to include in confirmation/reminder emails.",
                )
                .optional_string("customSubject", "Optional custom subject for generic updates.")
                .optional_string(
                    "customBody",
                    "Optional custom body text for generic updates. If omitted, a neutral \
                     template will be used.",
                ),
        );
        Self {
            definition,
            mailer,
            firm,
            latency,
        }
    }

    /// Subject and body for the scenario.
    pub fn compose(&self, input: &EmailInput) -> (String, String) {
        let name = &input.client_name;
        let when = input.appointment_date_time.as_deref();
        let regards = self.firm.sign_off("Best regards");
        match input.scenario {
            EmailScenario::IntakeConfirmation => (
                format!("Consultation confirmed – {name}"),
                format!(
                    "Dear {name},\n\nThank you for contacting our firm. Your consultation has \
                     been scheduled{}.\n\nLocation / Meeting Link:\n{}\n\nIf you need to \
                     reschedule, please reply to this email or call our office.\n\n{regards}",
                    when.map(|w| format!(" for {w}")).unwrap_or_default(),
                    self.firm
                        .location_or_default(input.office_location_or_link.as_deref()),
                ),
            ),
            EmailScenario::ConsultReminder => (
                format!("Upcoming consultation reminder – {name}"),
                format!(
                    "Dear {name},\n\nThis is a friendly reminder of your upcoming \
                     consultation{}.\n\nLocation / Meeting Link:\n{}\n\nPlease have any relevant \
                     documents ready, and plan to join a few minutes early.\n\n{regards}",
                    when.map(|w| format!(" on {w}")).unwrap_or_default(),
                    self.firm
                        .location_or_default(input.office_location_or_link.as_deref()),
                ),
            ),
            EmailScenario::AfterHoursReceipt => (
                format!("We received your message – {name}"),
                format!(
                    "Dear {name},\n\nThank you for reaching out. Our office is currently closed, \
                     but we have received your message{}.\n\nA member of our team will review \
                     your information and follow up during regular business hours.\n\nIf this \
                     is an emergency or a time-sensitive legal deadline, please indicate that \
                     clearly in your reply.\n\n{regards}",
                    when.map(|w| format!(" and noted your requested consultation time of {w}"))
                        .unwrap_or_default(),
                ),
            ),
            EmailScenario::GenericUpdate => (
                input
                    .custom_subject
                    .clone()
                    .unwrap_or_else(|| "Update regarding your matter".to_string()),
                input.custom_body.clone().unwrap_or_else(|| {
                    format!(
                        "Dear {name},\n\nWe wanted to share a brief update regarding your \
                         matter.\n\n[Insert update details here.]\n\n{regards}"
                    )
                }),
            ),
        }
    }
}

#[async_trait]
impl Tool for EmailAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: EmailInput = parse_input(args)?;
        self.latency.pause(300).await;

        let (subject, body) = self.compose(&input);
        let message_id = self
            .mailer
            .send(OutgoingEmail {
                to: input.recipient_email.clone(),
                subject: subject.clone(),
                body: body.clone(),
            })
            .await?;
        info!(
            scenario = ?input.scenario,
            message_id = %message_id,
            "Email sent"
        );

        Ok(format!(
            "Email prepared and sent to {}.\nSubject: {subject}\n\n{body}",
            input.recipient_email
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool() -> (EmailAgentTool, Arc<SimulatedMailer>) {
        let mailer = Arc::new(SimulatedMailer::new());
        let firm = FirmProfile {
            name: "Harbor & Pine LLP".into(),
            ..FirmProfile::default()
        };
        (
            EmailAgentTool::new(mailer.clone(), firm, Latency(false)),
            mailer,
        )
    }

    #[tokio::test]
    async fn confirmation_is_sent_and_signed() {
        let (tool, mailer) = tool();
        let out = tool
            .execute(json!({
                "scenario": "intakeConfirmation",
                "recipientEmail": "john@example.com",
                "clientName": "John Doe",
                "appointmentDateTime": "2026-10-20T10:00"
            }))
            .await
            .unwrap();
        assert!(out.starts_with("Email prepared and sent to john@example.com.\nSubject: Consultation confirmed – John Doe"));
        assert!(out.contains("scheduled for 2026-10-20T10:00."));
        assert!(out.contains("[Office address or video link will be provided separately]"));
        assert!(out.ends_with("Best regards,\nHarbor & Pine LLP"));

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email.to, "john@example.com");
    }

    #[tokio::test]
    async fn generic_update_falls_back_per_field() {
        let (tool, _) = tool();
        let out = tool
            .execute(json!({
                "scenario": "genericUpdate",
                "recipientEmail": "jane@example.com",
                "clientName": "Jane Roe",
                "customBody": "Your filing was accepted."
            }))
            .await
            .unwrap();
        assert!(out.contains("Subject: Update regarding your matter\n\nYour filing was accepted."));

        let out = tool
            .execute(json!({
                "scenario": "genericUpdate",
                "recipientEmail": "jane@example.com",
                "clientName": "Jane Roe",
                "customSubject": "Filing status"
            }))
            .await
            .unwrap();
        assert!(out.contains("Subject: Filing status"));
        assert!(out.contains("[Insert update details here.]"));
    }

    #[tokio::test]
    async fn after_hours_mentions_requested_time() {
        let (tool, _) = tool();
        let out = tool
            .execute(json!({
                "scenario": "afterHoursReceipt",
                "recipientEmail": "jane@example.com",
                "clientName": "Jane Roe",
                "appointmentDateTime": "Monday 9am"
            }))
            .await
            .unwrap();
        assert!(out.contains("noted your requested consultation time of Monday 9am"));
    }
}
