use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{event_attendees, event_tickets, events, lucky_draws, raffle_winners};

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i64) -> Result<Option<events::Model>> {
        events::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query event")
    }

    /// Most recent events first.
    pub async fn list(&self) -> Result<Vec<events::Model>> {
        events::Entity::find()
            .order_by_desc(events::Column::StartDate)
            .order_by_desc(events::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list events")
    }

    pub async fn get_ticket(&self, id: i64) -> Result<Option<event_tickets::Model>> {
        event_tickets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query ticket")
    }

    pub async fn find_ticket(&self, event_id: i64, ticket_no: &str) -> Result<Option<event_tickets::Model>> {
        event_tickets::Entity::find()
            .filter(event_tickets::Column::EventId.eq(event_id))
            .filter(event_tickets::Column::TicketNo.eq(ticket_no))
            .one(&self.conn)
            .await
            .context("Failed to query ticket by number")
    }

    pub async fn list_tickets(&self, event_id: i64) -> Result<Vec<event_tickets::Model>> {
        event_tickets::Entity::find()
            .filter(event_tickets::Column::EventId.eq(event_id))
            .order_by_asc(event_tickets::Column::TicketNo)
            .all(&self.conn)
            .await
            .context("Failed to list tickets")
    }

    pub async fn get_attendee(&self, id: i64) -> Result<Option<event_attendees::Model>> {
        event_attendees::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query attendee")
    }

    pub async fn list_attendees(&self, event_id: i64) -> Result<Vec<event_attendees::Model>> {
        event_attendees::Entity::find()
            .filter(event_attendees::Column::EventId.eq(event_id))
            .order_by_asc(event_attendees::Column::AttendedAt)
            .order_by_asc(event_attendees::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list attendees")
    }

    /// Remove an event with its draws, winners, attendance and tickets on
    /// `txn`; the caller commits. Returns `false` when the event does not exist.
    pub async fn delete_cascade<C: ConnectionTrait>(txn: &C, id: i64) -> Result<bool> {
        let draw_ids: Vec<i64> = lucky_draws::Entity::find()
            .select_only()
            .column(lucky_draws::Column::Id)
            .filter(lucky_draws::Column::EventId.eq(id))
            .into_tuple()
            .all(txn)
            .await
            .context("Failed to load event draws")?;

        if !draw_ids.is_empty() {
            raffle_winners::Entity::delete_many()
                .filter(raffle_winners::Column::DrawId.is_in(draw_ids))
                .exec(txn)
                .await
                .context("Failed to delete raffle winners")?;
        }

        lucky_draws::Entity::delete_many()
            .filter(lucky_draws::Column::EventId.eq(id))
            .exec(txn)
            .await
            .context("Failed to delete lucky draws")?;

        event_attendees::Entity::delete_many()
            .filter(event_attendees::Column::EventId.eq(id))
            .exec(txn)
            .await
            .context("Failed to delete attendance")?;

        event_tickets::Entity::delete_many()
            .filter(event_tickets::Column::EventId.eq(id))
            .exec(txn)
            .await
            .context("Failed to delete tickets")?;

        let deleted = events::Entity::delete_by_id(id)
            .exec(txn)
            .await
            .context("Failed to delete event")?;

        Ok(deleted.rows_affected > 0)
    }
}
