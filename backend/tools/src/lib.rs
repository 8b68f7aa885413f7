//! LexDesk front-desk tools.
//!
//! Each tool validates nothing itself (the dispatcher checks arguments
//! against the schema first), deserializes its typed input, talks to a
//! collaborator where one is involved, and returns templated text.
//! Collaborators are traits; the `Simulated*` implementations keep state
//! in memory and stand in for real calendar, email, records and telephony
//! providers.

pub mod calendar;
pub mod call;
pub mod chat_ai;
pub mod document;
pub mod email;
pub mod firm;
pub mod intake;
pub mod portfolio;
pub mod receptionist;
pub mod records;
pub mod voice;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use lexdesk_core::{DeskError, ToolError, ToolRegistry};

pub use calendar::{CalendarAgentTool, CalendarProvider, SimulatedCalendar};
pub use call::CallAgentTool;
pub use chat_ai::ChatAiAgentTool;
pub use document::DocumentAgentTool;
pub use email::{EmailAgentTool, EmailProvider, SimulatedMailer};
pub use firm::FirmProfile;
pub use intake::IntakeAgentTool;
pub use portfolio::PortfolioManagerTool;
pub use receptionist::ReceptionistTool;
pub use records::{InMemoryRecordStore, RecordStore};
pub use voice::{SimulatedVoiceAgent, VoiceAgentProvider};

/// Settings shared by all tools.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub firm: FirmProfile,
    /// Reject reschedules that cannot be tied to an existing booking.
    pub strict_reschedule: bool,
    /// Apply the artificial handler delays.
    pub simulate_latency: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            firm: FirmProfile::default(),
            strict_reschedule: false,
            simulate_latency: true,
        }
    }
}

/// External systems reachable from the tools.
#[derive(Clone)]
pub struct Collaborators {
    pub calendar: Arc<dyn CalendarProvider>,
    pub email: Arc<dyn EmailProvider>,
    pub records: Arc<dyn RecordStore>,
    pub voice: Arc<dyn VoiceAgentProvider>,
}

impl Collaborators {
    /// In-memory stand-ins for every provider.
    pub fn simulated() -> Self {
        Self {
            calendar: Arc::new(SimulatedCalendar::new()),
            email: Arc::new(SimulatedMailer::new()),
            records: Arc::new(InMemoryRecordStore::new()),
            voice: Arc::new(SimulatedVoiceAgent::new()),
        }
    }
}

/// Build the registry with all eight tools, in model-facing priority order.
pub fn default_registry(
    collaborators: &Collaborators,
    settings: &ToolSettings,
) -> Result<ToolRegistry, DeskError> {
    let latency = Latency(settings.simulate_latency);
    ToolRegistry::builder()
        .register(Arc::new(ReceptionistTool::new(latency)))
        .register(Arc::new(PortfolioManagerTool::new(
            collaborators.records.clone(),
            latency,
        )))
        .register(Arc::new(CalendarAgentTool::new(
            collaborators.calendar.clone(),
            settings.firm.clone(),
            settings.strict_reschedule,
        )))
        .register(Arc::new(EmailAgentTool::new(
            collaborators.email.clone(),
            settings.firm.clone(),
            latency,
        )))
        .register(Arc::new(ChatAiAgentTool::new(collaborators.voice.clone())))
        .register(Arc::new(IntakeAgentTool::new(collaborators.records.clone())))
        .register(Arc::new(DocumentAgentTool::new(settings.firm.clone())))
        .register(Arc::new(CallAgentTool::new(collaborators.voice.clone())))
        .build()
}

/// Artificial handler delay, switched off in tests.
#[derive(Debug, Clone, Copy)]
pub struct Latency(pub bool);

impl Latency {
    pub async fn pause(self, millis: u64) {
        if self.0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

/// Deserialize validated arguments into a tool's typed input.
pub(crate) fn parse_input<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_all_tools_in_order() {
        let registry =
            default_registry(&Collaborators::simulated(), &ToolSettings::default()).unwrap();
        assert_eq!(
            registry.names(),
            &[
                "receptionist",
                "portfolioManager",
                "calendarAgent",
                "emailAgent",
                "chatAIAgent",
                "intakeAgent",
                "documentAgent",
                "callAgent",
            ]
        );
    }

    #[test]
    fn every_tool_has_description_and_schema() {
        let registry =
            default_registry(&Collaborators::simulated(), &ToolSettings::default()).unwrap();
        for def in registry.definitions() {
            assert!(!def.description.is_empty(), "{} lacks a description", def.name);
            assert!(!def.input_schema.fields.is_empty(), "{} lacks fields", def.name);
        }
    }
}
