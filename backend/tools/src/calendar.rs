//! Calendar agent: availability checks, new consultations and reschedules.
//!
//! Rescheduling has to be tied to an existing booking, either through
//! `existingEventId` or through the client's email. When neither matches,
//! permissive mode still answers (flagging that staff must confirm) while
//! strict mode fails the call with a missing-correlation error.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::firm::FirmProfile;
use crate::parse_input;

const DEFAULT_DURATION_MINUTES: u32 = 60;
const PRIMARY_CALENDAR: &str = "primary";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub attendee_email: String,
    pub attendee_phone: Option<String>,
    pub start: String,
    pub duration_minutes: u32,
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub calendar_id: String,
    pub title: String,
    pub attendee_email: String,
    pub attendee_phone: Option<String>,
    pub start: String,
    pub duration_minutes: u32,
    pub timezone: String,
}

/// Calendar backend (Google Calendar in a real deployment).
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn available_slots(&self, calendar_id: &str, duration_minutes: u32) -> Result<Vec<String>>;
    async fn book(&self, request: BookingRequest) -> Result<CalendarEvent>;
    async fn get(&self, event_id: &str) -> Result<Option<CalendarEvent>>;
    /// Most recent booking on `calendar_id` for the attendee.
    async fn find_by_attendee(&self, calendar_id: &str, email: &str)
        -> Result<Option<CalendarEvent>>;
    async fn reschedule(
        &self,
        event_id: &str,
        start: &str,
        duration_minutes: u32,
    ) -> Result<CalendarEvent>;
}

/// In-memory calendar. Slots are offered on the next two business days.
pub struct SimulatedCalendar {
    events: Arc<RwLock<Vec<CalendarEvent>>>,
}

impl SimulatedCalendar {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.events.read().await.clone()
    }
}

impl Default for SimulatedCalendar {
    fn default() -> Self {
        Self::new()
    }
}

fn next_business_day(after: NaiveDate) -> NaiveDate {
    let mut day = after + Duration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day += Duration::days(1);
    }
    day
}

/// Candidate slots: 10:00 and 14:00 on the next business day, 09:30 on the one after.
fn candidate_slots(today: NaiveDate) -> Vec<String> {
    let first = next_business_day(today);
    let second = next_business_day(first);
    vec![
        format!("{}T10:00", first.format("%Y-%m-%d")),
        format!("{}T14:00", first.format("%Y-%m-%d")),
        format!("{}T09:30", second.format("%Y-%m-%d")),
    ]
}

#[async_trait]
impl CalendarProvider for SimulatedCalendar {
    async fn available_slots(&self, calendar_id: &str, _duration_minutes: u32) -> Result<Vec<String>> {
        let events = self.events.read().await;
        Ok(candidate_slots(Utc::now().date_naive())
            .into_iter()
            .filter(|slot| {
                !events
                    .iter()
                    .any(|e| e.calendar_id == calendar_id && &e.start == slot)
            })
            .collect())
    }

    async fn book(&self, request: BookingRequest) -> Result<CalendarEvent> {
        let event = CalendarEvent {
            id: format!("evt_{}", Uuid::new_v4().simple()),
            calendar_id: request.calendar_id,
            title: request.title,
            attendee_email: request.attendee_email,
            attendee_phone: request.attendee_phone,
            start: request.start,
            duration_minutes: request.duration_minutes,
            timezone: request.timezone,
        };
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn get(&self, event_id: &str) -> Result<Option<CalendarEvent>> {
        Ok(self.events.read().await.iter().find(|e| e.id == event_id).cloned())
    }

    async fn find_by_attendee(
        &self,
        calendar_id: &str,
        email: &str,
    ) -> Result<Option<CalendarEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .rev()
            .find(|e| e.calendar_id == calendar_id && e.attendee_email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn reschedule(
        &self,
        event_id: &str,
        start: &str,
        duration_minutes: u32,
    ) -> Result<CalendarEvent> {
        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| anyhow!("event {event_id} not found"))?;
        event.start = start.to_string();
        event.duration_minutes = duration_minutes;
        Ok(event.clone())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CalendarScenario {
    NewIntakeConsult,
    RescheduleConsult,
    CheckAvailability,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInput {
    pub scenario: CalendarScenario,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub preferred_date_time: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub lawyer_calendar_id: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub existing_event_id: Option<String>,
}

impl CalendarInput {
    /// Fractional minutes are rounded; anything under one minute is rejected.
    fn check_duration(&self) -> Result<(), ToolError> {
        match self.duration_minutes {
            Some(minutes) if !minutes.is_finite() || minutes.round() < 1.0 => {
                Err(ToolError::InvalidInput(format!(
                    "durationMinutes must be a positive number of minutes, got {minutes}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn duration(&self) -> u32 {
        self.duration_minutes
            .map(|minutes| minutes.round() as u32)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    fn calendar_id(&self) -> &str {
        self.lawyer_calendar_id.as_deref().unwrap_or(PRIMARY_CALENDAR)
    }

    fn calendar_label(&self) -> &str {
        self.lawyer_calendar_id.as_deref().unwrap_or("primary calendar")
    }
}

/// How a reschedule request was tied to an existing booking.
enum Correlation {
    Found(CalendarEvent),
    UnknownEventId(String),
    NoMatch,
}

pub struct CalendarAgentTool {
    definition: ToolDefinition,
    calendar: Arc<dyn CalendarProvider>,
    firm: FirmProfile,
    strict_reschedule: bool,
}

impl CalendarAgentTool {
    pub fn new(calendar: Arc<dyn CalendarProvider>, firm: FirmProfile, strict_reschedule: bool) -> Self {
        let definition = ToolDefinition::new(
            "calendarAgent",
            "Manage scheduling for consultations using the firm calendar. Use this to check \
             availability, book new client consultations, and reschedule existing ones.",
            InputSchema::new()
                .required_enum(
                    "scenario",
                    &["newIntakeConsult", "rescheduleConsult", "checkAvailability"],
                    "Scheduling scenario to handle",
                )
                .required_string("clientName", "Client full name")
                .required_string("clientEmail", "Client email address")
                .optional_string(
                    "clientPhone",
                    "Client phone number, used in event description when available",
                )
                .optional_string(
                    "preferredDateTime",
                    "Client's preferred date/time in ISO-8601 format if given \
                     (e.g., '2025-12-20T10:00:00-08:00').",
                )
                .optional_number("durationMinutes", "Consultation duration in minutes, default is 60.")
                .optional_string(
                    "lawyerCalendarId",
                    "Calendar ID for the lawyer or firm resource (e.g., 'lawyer@example.com'). \
                     If omitted, use primary calendar.",
                )
                .optional_string(
                    "timezone",
                    "IANA timezone string for the client, e.g. 'America/Los_Angeles'.",
                )
                .optional_string(
                    "existingEventId",
                    "If rescheduling, the calendar event ID of the existing appointment.",
                ),
        );
        Self {
            definition,
            calendar,
            firm,
            strict_reschedule,
        }
    }

    async fn check_availability(&self, input: &CalendarInput) -> Result<String, ToolError> {
        let slots = self
            .calendar
            .available_slots(input.calendar_id(), input.duration())
            .await?;
        let mut out = format!(
            "Checked availability for {} on {}.\n\nAvailable slots (client timezone: {}):",
            input.client_name,
            input.calendar_label(),
            self.firm.timezone_or_default(input.timezone.as_deref()),
        );
        if slots.is_empty() {
            out.push_str("\n- No open slots in the next two business days");
        }
        for slot in &slots {
            out.push_str(&format!("\n- {slot}"));
        }
        out.push_str(&format!(
            "\n\nAll slots are {}-minute consultations.",
            input.duration()
        ));
        Ok(out)
    }

    async fn book_new(&self, input: &CalendarInput) -> Result<String, ToolError> {
        let start = match &input.preferred_date_time {
            Some(preferred) => preferred.clone(),
            None => self
                .calendar
                .available_slots(input.calendar_id(), input.duration())
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ToolError::Provider("no open slots available".to_string()))?,
        };
        let timezone = self.firm.timezone_or_default(input.timezone.as_deref()).to_string();
        let event = self
            .calendar
            .book(BookingRequest {
                calendar_id: input.calendar_id().to_string(),
                title: format!("Initial Consultation – {}", input.client_name),
                attendee_email: input.client_email.clone(),
                attendee_phone: input.client_phone.clone(),
                start,
                duration_minutes: input.duration(),
                timezone: timezone.clone(),
            })
            .await?;
        info!(event_id = %event.id, calendar = %event.calendar_id, "Consultation booked");

        let phone_line = input
            .client_phone
            .as_ref()
            .map(|p| format!("\n- Phone: {p}"))
            .unwrap_or_default();
        Ok(format!(
            "New consultation booked for {} on {} at {} for {} minutes.\n\nEvent details:\n\
             - Event ID: {}\n- Title: {}\n- Attendee: {}{}\n- Timezone: {}\n\n\
             A calendar event was created and an invite sent to the client.",
            input.client_name,
            input.calendar_label(),
            event.start,
            event.duration_minutes,
            event.id,
            event.title,
            event.attendee_email,
            phone_line,
            timezone,
        ))
    }

    async fn correlate(&self, input: &CalendarInput) -> Result<Correlation, ToolError> {
        if let Some(id) = &input.existing_event_id {
            return Ok(match self.calendar.get(id).await? {
                Some(event) => Correlation::Found(event),
                None => Correlation::UnknownEventId(id.clone()),
            });
        }
        Ok(
            match self
                .calendar
                .find_by_attendee(input.calendar_id(), &input.client_email)
                .await?
            {
                Some(event) => Correlation::Found(event),
                None => Correlation::NoMatch,
            },
        )
    }

    async fn reschedule(&self, input: &CalendarInput) -> Result<String, ToolError> {
        let correlation = self.correlate(input).await?;
        match correlation {
            Correlation::Found(event) => {
                let start = match &input.preferred_date_time {
                    Some(preferred) => preferred.clone(),
                    None => self
                        .calendar
                        .available_slots(input.calendar_id(), input.duration())
                        .await?
                        .into_iter()
                        .next()
                        .ok_or_else(|| ToolError::Provider("no open slots available".to_string()))?,
                };
                let updated = self
                    .calendar
                    .reschedule(&event.id, &start, input.duration())
                    .await?;
                info!(event_id = %updated.id, start = %updated.start, "Consultation rescheduled");
                Ok(format!(
                    "Consultation for {} has been rescheduled on {}.\n\nExisting event {} was \
                     updated to {} for {} minutes.\n\nThe client at {} has been notified and sent \
                     an updated calendar invite.",
                    input.client_name,
                    input.calendar_label(),
                    updated.id,
                    updated.start,
                    updated.duration_minutes,
                    input.client_email,
                ))
            }
            Correlation::UnknownEventId(id) if self.strict_reschedule => Err(
                ToolError::MissingCorrelation(format!("no booking found with existingEventId {id}")),
            ),
            Correlation::NoMatch if self.strict_reschedule => {
                Err(ToolError::MissingCorrelation(format!(
                    "rescheduleConsult needs existingEventId or an existing booking for {}; none found",
                    input.client_email
                )))
            }
            Correlation::UnknownEventId(id) => {
                warn!(event_id = %id, "Reschedule references an unknown event");
                Ok(format!(
                    "Consultation for {} has been marked for rescheduling on {}.\n\nExisting event \
                     {} could not be confirmed in the calendar; the change to {} for {} minutes \
                     needs staff confirmation.\n\nThe client at {} will receive an updated invite \
                     once confirmed.",
                    input.client_name,
                    input.calendar_label(),
                    id,
                    self.requested_time(input),
                    input.duration(),
                    input.client_email,
                ))
            }
            Correlation::NoMatch => {
                warn!(client = %input.client_name, "Reschedule has no matching booking");
                Ok(format!(
                    "Consultation for {} has been marked for rescheduling on {}.\n\nNo existing \
                     booking could be matched for {}; the request for {} ({} minutes) was \
                     recorded and needs staff confirmation.",
                    input.client_name,
                    input.calendar_label(),
                    input.client_email,
                    self.requested_time(input),
                    input.duration(),
                ))
            }
        }
    }

    fn requested_time<'a>(&self, input: &'a CalendarInput) -> &'a str {
        input.preferred_date_time.as_deref().unwrap_or(
            "a new available slot similar to the original appointment time during business hours",
        )
    }
}

#[async_trait]
impl Tool for CalendarAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: CalendarInput = parse_input(args)?;
        input.check_duration()?;
        match input.scenario {
            CalendarScenario::CheckAvailability => self.check_availability(&input).await,
            CalendarScenario::NewIntakeConsult => self.book_new(&input).await,
            CalendarScenario::RescheduleConsult => self.reschedule(&input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdesk_core::validate_arguments;
    use serde_json::json;

    fn tool(strict: bool) -> (CalendarAgentTool, Arc<SimulatedCalendar>) {
        let calendar = Arc::new(SimulatedCalendar::new());
        let tool = CalendarAgentTool::new(calendar.clone(), FirmProfile::default(), strict);
        (tool, calendar)
    }

    #[test]
    fn slots_skip_weekends() {
        // 2026-10-16 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let slots = candidate_slots(friday);
        assert_eq!(slots[0], "2026-10-19T10:00");
        assert_eq!(slots[2], "2026-10-20T09:30");
    }

    #[tokio::test]
    async fn new_consult_books_an_event() {
        let (tool, calendar) = tool(false);
        let out = tool
            .execute(json!({
                "scenario": "newIntakeConsult",
                "clientName": "John Doe",
                "clientEmail": "john@example.com",
                "preferredDateTime": "2026-10-20T10:00:00-07:00"
            }))
            .await
            .unwrap();
        let events = calendar.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration_minutes, 60);
        assert!(out.contains(&events[0].id));
        assert!(out.contains("2026-10-20T10:00:00-07:00"));
    }

    #[tokio::test]
    async fn reschedule_by_email_updates_the_booking() {
        let (tool, calendar) = tool(true);
        tool.execute(json!({
            "scenario": "newIntakeConsult",
            "clientName": "John Doe",
            "clientEmail": "john@example.com",
            "preferredDateTime": "2026-10-20T10:00"
        }))
        .await
        .unwrap();
        let out = tool
            .execute(json!({
                "scenario": "rescheduleConsult",
                "clientName": "John Doe",
                "clientEmail": "JOHN@example.com",
                "preferredDateTime": "2026-10-22T15:00",
                "durationMinutes": 30
            }))
            .await
            .unwrap();
        let events = calendar.events().await;
        assert_eq!(events[0].start, "2026-10-22T15:00");
        assert_eq!(events[0].duration_minutes, 30);
        assert!(out.contains("rescheduled"));
    }

    #[tokio::test]
    async fn fractional_duration_is_accepted_and_rounded() {
        let (tool, calendar) = tool(false);
        let args = json!({
            "scenario": "newIntakeConsult",
            "clientName": "Ada Park",
            "clientEmail": "ada@example.com",
            "durationMinutes": 60.0
        });
        validate_arguments(tool.definition(), &args).unwrap();
        tool.execute(args).await.unwrap();

        tool.execute(json!({
            "scenario": "newIntakeConsult",
            "clientName": "Ben Park",
            "clientEmail": "ben@example.com",
            "durationMinutes": 44.6
        }))
        .await
        .unwrap();

        let events = calendar.events().await;
        assert_eq!(events[0].duration_minutes, 60);
        assert_eq!(events[1].duration_minutes, 45);
    }

    #[tokio::test]
    async fn non_positive_duration_is_rejected() {
        let (tool, calendar) = tool(false);
        for minutes in [json!(0), json!(-30), json!(0.2)] {
            let err = tool
                .execute(json!({
                    "scenario": "newIntakeConsult",
                    "clientName": "Ada Park",
                    "clientEmail": "ada@example.com",
                    "durationMinutes": minutes
                }))
                .await
                .unwrap_err();
            assert!(matches!(&err, ToolError::InvalidInput(m) if m.contains("durationMinutes")));
        }
        assert!(calendar.events().await.is_empty());
    }

    #[tokio::test]
    async fn uncorrelated_reschedule_is_permitted_but_flagged() {
        let (tool, _) = tool(false);
        let out = tool
            .execute(json!({
                "scenario": "rescheduleConsult",
                "clientName": "Jane Roe",
                "clientEmail": "jane@example.com"
            }))
            .await
            .unwrap();
        assert!(out.contains("No existing booking could be matched"));
        assert!(out.contains("needs staff confirmation"));
    }

    #[tokio::test]
    async fn uncorrelated_reschedule_fails_in_strict_mode() {
        let (tool, _) = tool(true);
        let err = tool
            .execute(json!({
                "scenario": "rescheduleConsult",
                "clientName": "Jane Roe",
                "clientEmail": "jane@example.com"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingCorrelation(_)));

        let err = tool
            .execute(json!({
                "scenario": "rescheduleConsult",
                "clientName": "Jane Roe",
                "clientEmail": "jane@example.com",
                "existingEventId": "evt_missing"
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("evt_missing"));
    }

    #[tokio::test]
    async fn availability_lists_slots() {
        let (tool, _) = tool(false);
        let out = tool
            .execute(json!({
                "scenario": "checkAvailability",
                "clientName": "Jane Roe",
                "clientEmail": "jane@example.com",
                "durationMinutes": 45
            }))
            .await
            .unwrap();
        assert!(out.contains("45-minute"));
        assert_eq!(out.matches("\n- ").count(), 3);
    }
}
