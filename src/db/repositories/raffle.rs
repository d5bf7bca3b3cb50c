use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{event_attendees, lucky_draws, raffle_winners};

/// A winner joined with its draw and attendee record.
#[derive(Debug, Clone)]
pub struct WinnerRecord {
    pub winner: raffle_winners::Model,
    pub draw: lucky_draws::Model,
    pub attendee: Option<event_attendees::Model>,
}

pub struct RaffleRepository {
    conn: DatabaseConnection,
}

impl RaffleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_draw(&self, id: i64) -> Result<Option<lucky_draws::Model>> {
        lucky_draws::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query lucky draw")
    }

    pub async fn list_draws(&self, event_id: i64) -> Result<Vec<lucky_draws::Model>> {
        lucky_draws::Entity::find()
            .filter(lucky_draws::Column::EventId.eq(event_id))
            .order_by_asc(lucky_draws::Column::StartTime)
            .order_by_asc(lucky_draws::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list lucky draws")
    }

    pub async fn winner_for(&self, draw_id: i64) -> Result<Option<raffle_winners::Model>> {
        raffle_winners::Entity::find()
            .filter(raffle_winners::Column::DrawId.eq(draw_id))
            .one(&self.conn)
            .await
            .context("Failed to query raffle winner")
    }

    pub async fn winners_for_event(&self, event_id: i64) -> Result<Vec<WinnerRecord>> {
        let rows = raffle_winners::Entity::find()
            .find_also_related(lucky_draws::Entity)
            .filter(lucky_draws::Column::EventId.eq(event_id))
            .order_by_asc(raffle_winners::Column::WonAt)
            .all(&self.conn)
            .await
            .context("Failed to list raffle winners")?;

        let attendee_ids: Vec<i64> = rows.iter().map(|(w, _)| w.attendee_id).collect();
        let attendees = event_attendees::Entity::find()
            .filter(event_attendees::Column::Id.is_in(attendee_ids))
            .all(&self.conn)
            .await
            .context("Failed to load winning attendees")?;

        Ok(rows
            .into_iter()
            .filter_map(|(winner, draw)| {
                let draw = draw?;
                let attendee = attendees.iter().find(|a| a.id == winner.attendee_id).cloned();
                Some(WinnerRecord {
                    winner,
                    draw,
                    attendee,
                })
            })
            .collect())
    }

    /// Attendees of the event who have not won any of its draws yet.
    pub async fn eligible_attendees<C: ConnectionTrait>(
        conn: &C,
        event_id: i64,
    ) -> Result<Vec<event_attendees::Model>> {
        let won: Vec<i64> = raffle_winners::Entity::find()
            .select_only()
            .column(raffle_winners::Column::AttendeeId)
            .inner_join(lucky_draws::Entity)
            .filter(lucky_draws::Column::EventId.eq(event_id))
            .into_tuple()
            .all(conn)
            .await
            .context("Failed to load previous winners")?;

        event_attendees::Entity::find()
            .filter(event_attendees::Column::EventId.eq(event_id))
            .filter(event_attendees::Column::Id.is_not_in(won))
            .order_by_asc(event_attendees::Column::Id)
            .all(conn)
            .await
            .context("Failed to load eligible attendees")
    }
}
