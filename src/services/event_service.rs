//! Domain service for events, tickets and attendance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{event_attendees, event_tickets, events};
use crate::membership::patch::check_date;
use crate::services::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    #[serde(default)]
    pub venue: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl EventInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::invalid("Event name is required"));
        }
        check_date("start_date", &self.start_date)?;
        check_date("end_date", &self.end_date)?;
        if self.end_date.trim() < self.start_date.trim() {
            return Err(ServiceError::invalid("Event cannot end before it starts"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketInput {
    pub ticket_no: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub civil_id: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
}

/// Identifies who arrived: a member by membership identifier, or a ticket holder.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    #[serde(default)]
    pub membership_id: Option<String>,
    #[serde(default)]
    pub ticket_no: Option<String>,
    /// Guests accompanying the attendee
    #[serde(default)]
    pub extra_guests: i32,
}

impl AttendanceInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let given = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if given(&self.membership_id) == given(&self.ticket_no) {
            return Err(ServiceError::invalid(
                "Provide either a membership ID or a ticket number",
            ));
        }
        if !(0..=50).contains(&self.extra_guests) {
            return Err(ServiceError::invalid("extra_guests must be between 0 and 50"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub attendees: u64,
    pub people: u64,
}

#[async_trait::async_trait]
pub trait EventService: Send + Sync {
    async fn create_event(&self, input: EventInput) -> Result<events::Model, ServiceError>;

    async fn update_event(&self, id: i64, input: EventInput) -> Result<events::Model, ServiceError>;

    async fn get_event(&self, id: i64) -> Result<events::Model, ServiceError>;

    async fn list_events(&self) -> Result<Vec<events::Model>, ServiceError>;

    /// Deletes the event with its tickets, attendance and draws in one transaction.
    async fn delete_event(&self, id: i64) -> Result<(), ServiceError>;

    async fn create_ticket(&self, event_id: i64, input: TicketInput) -> Result<event_tickets::Model, ServiceError>;

    async fn update_ticket(&self, id: i64, input: TicketInput) -> Result<event_tickets::Model, ServiceError>;

    async fn delete_ticket(&self, id: i64) -> Result<(), ServiceError>;

    async fn list_tickets(&self, event_id: i64) -> Result<Vec<event_tickets::Model>, ServiceError>;

    /// Records arrival of one attendee plus guests.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if the attendee was already marked for this event.
    async fn mark_attended(
        &self,
        event_id: i64,
        input: AttendanceInput,
    ) -> Result<event_attendees::Model, ServiceError>;

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<event_attendees::Model>, ServiceError>;

    async fn attendance_summary(&self, event_id: i64) -> Result<AttendanceSummary, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_dates_ordered() {
        let input = EventInput {
            name: "Onam".to_string(),
            venue: None,
            start_date: "2026-09-10".to_string(),
            end_date: "2026-09-09".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_attendance_needs_exactly_one_key() {
        let both: AttendanceInput =
            serde_json::from_str(r#"{"membership_id": "KWSKW05000", "ticket_no": "T1"}"#).unwrap();
        assert!(both.validate().is_err());

        let neither: AttendanceInput = serde_json::from_str(r#"{"extra_guests": 2}"#).unwrap();
        assert!(neither.validate().is_err());

        let member: AttendanceInput =
            serde_json::from_str(r#"{"membership_id": "KWSKW05000", "extra_guests": 2}"#).unwrap();
        assert!(member.validate().is_ok());
    }
}
