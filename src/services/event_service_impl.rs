//! `SeaORM` implementation of the `EventService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::time::Duration;

use crate::db::{EventRepository, Store};
use crate::entities::members::MemberStatus;
use crate::entities::{event_attendees, event_tickets, events};
use crate::ledger::money::to_fils;
use crate::services::event_service::{
    AttendanceInput, AttendanceSummary, EventInput, EventService, TicketInput,
};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmEventService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmEventService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn ticket_fields(active: &mut event_tickets::ActiveModel, input: TicketInput) -> Result<(), ServiceError> {
    if input.ticket_no.trim().is_empty() || input.name.trim().is_empty() {
        return Err(ServiceError::invalid("Ticket number and holder name are required"));
    }
    let amount_fils = to_fils(input.amount)
        .filter(|fils| *fils >= 0)
        .ok_or_else(|| ServiceError::invalid("Ticket amount must be a non-negative KWD value"))?;

    active.ticket_no = Set(input.ticket_no.trim().to_string());
    active.name = Set(input.name.trim().to_string());
    active.phone = Set(trimmed(input.phone));
    active.civil_id = Set(trimmed(input.civil_id));
    active.amount_fils = Set(amount_fils);
    Ok(())
}

#[async_trait]
impl EventService for SeaOrmEventService {
    async fn create_event(&self, input: EventInput) -> Result<events::Model, ServiceError> {
        input.validate()?;
        let now = chrono::Utc::now().to_rfc3339();

        let active = events::ActiveModel {
            name: Set(input.name.trim().to_string()),
            venue: Set(trimmed(input.venue)),
            start_date: Set(input.start_date.trim().to_string()),
            end_date: Set(input.end_date.trim().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        let event = with_deadline(self.timeout, async {
            Ok(active.insert(&self.store.conn).await?)
        })
        .await?;

        tracing::info!(event_id = event.id, name = %event.name, "Event created");
        Ok(event)
    }

    async fn update_event(&self, id: i64, input: EventInput) -> Result<events::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_event(id).await?;

        let mut active: events::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.venue = Set(trimmed(input.venue));
        active.start_date = Set(input.start_date.trim().to_string());
        active.end_date = Set(input.end_date.trim().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        with_deadline(self.timeout, async {
            Ok(active.update(&self.store.conn).await?)
        })
        .await
    }

    async fn get_event(&self, id: i64) -> Result<events::Model, ServiceError> {
        self.store
            .events()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))
    }

    async fn list_events(&self) -> Result<Vec<events::Model>, ServiceError> {
        Ok(self.store.events().list().await?)
    }

    async fn delete_event(&self, id: i64) -> Result<(), ServiceError> {
        let deleted = with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;
            let deleted = EventRepository::delete_cascade(&txn, id).await?;
            if deleted {
                txn.commit().await?;
            }
            Ok(deleted)
        })
        .await?;

        if !deleted {
            return Err(ServiceError::not_found("Event", id));
        }

        tracing::info!(event_id = id, "Event deleted with tickets, attendance and draws");
        Ok(())
    }

    async fn create_ticket(&self, event_id: i64, input: TicketInput) -> Result<event_tickets::Model, ServiceError> {
        self.get_event(event_id).await?;

        let mut active = event_tickets::ActiveModel {
            event_id: Set(event_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        ticket_fields(&mut active, input)?;

        with_deadline(self.timeout, async {
            Ok(active.insert(&self.store.conn).await?)
        })
        .await
    }

    async fn update_ticket(&self, id: i64, input: TicketInput) -> Result<event_tickets::Model, ServiceError> {
        let existing = self
            .store
            .events()
            .get_ticket(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Ticket", id))?;

        let mut active: event_tickets::ActiveModel = existing.into();
        ticket_fields(&mut active, input)?;

        with_deadline(self.timeout, async {
            Ok(active.update(&self.store.conn).await?)
        })
        .await
    }

    async fn delete_ticket(&self, id: i64) -> Result<(), ServiceError> {
        let result = with_deadline(self.timeout, async {
            Ok(event_tickets::Entity::delete_by_id(id)
                .exec(&self.store.conn)
                .await?)
        })
        .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Ticket", id));
        }
        Ok(())
    }

    async fn list_tickets(&self, event_id: i64) -> Result<Vec<event_tickets::Model>, ServiceError> {
        self.get_event(event_id).await?;
        Ok(self.store.events().list_tickets(event_id).await?)
    }

    async fn mark_attended(
        &self,
        event_id: i64,
        input: AttendanceInput,
    ) -> Result<event_attendees::Model, ServiceError> {
        input.validate()?;
        self.get_event(event_id).await?;

        let mut active = event_attendees::ActiveModel {
            event_id: Set(event_id),
            num_people: Set(1 + input.extra_guests),
            attended_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        if let Some(membership_id) = input.membership_id.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            let member = self
                .store
                .members()
                .get_by_membership_id(membership_id)
                .await?
                .filter(|m| m.status == MemberStatus::Approved)
                .ok_or_else(|| ServiceError::not_found("Active member", membership_id))?;

            active.attendee_key = Set(membership_id.to_string());
            active.ticket_no = Set(None);
            active.name = Set(member.full_name());
            active.phone = Set(member.kuwait_contact.clone());
            active.civil_id = Set(Some(member.civil_id.clone()));
        } else if let Some(ticket_no) = input.ticket_no.as_deref().map(str::trim) {
            let ticket = self
                .store
                .events()
                .find_ticket(event_id, ticket_no)
                .await?
                .ok_or_else(|| ServiceError::not_found("Ticket", ticket_no))?;

            active.attendee_key = Set(ticket.ticket_no.clone());
            active.ticket_no = Set(Some(ticket.ticket_no));
            active.name = Set(ticket.name);
            active.phone = Set(ticket.phone);
            active.civil_id = Set(ticket.civil_id);
        }

        let attendee = with_deadline(self.timeout, async {
            Ok(active.insert(&self.store.conn).await?)
        })
        .await
        .map_err(|e| match e {
            ServiceError::Conflict(_) => ServiceError::conflict("Attendance already recorded for this event"),
            other => other,
        })?;

        tracing::info!(
            event_id,
            attendee = %attendee.attendee_key,
            people = attendee.num_people,
            "Attendance recorded"
        );
        Ok(attendee)
    }

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<event_attendees::Model>, ServiceError> {
        self.get_event(event_id).await?;
        Ok(self.store.events().list_attendees(event_id).await?)
    }

    async fn attendance_summary(&self, event_id: i64) -> Result<AttendanceSummary, ServiceError> {
        let attendees = self.list_attendees(event_id).await?;
        Ok(AttendanceSummary {
            attendees: attendees.len() as u64,
            people: attendees
                .iter()
                .map(|a| u64::try_from(a.num_people).unwrap_or(0))
                .sum(),
        })
    }
}
