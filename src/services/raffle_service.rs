//! Domain service for lucky draws run at events.

use serde::Deserialize;

use crate::db::WinnerRecord;
use crate::entities::{event_attendees, lucky_draws};
use crate::services::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct DrawInput {
    pub prize: String,
    #[serde(default)]
    pub sponsor: Option<String>,
    /// Scheduled time, free-form as shown on the event programme
    #[serde(default)]
    pub start_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpinResult {
    pub draw: lucky_draws::Model,
    pub winner: event_attendees::Model,
    /// Size of the pool the winner was drawn from
    pub participants: i32,
}

#[async_trait::async_trait]
pub trait RaffleService: Send + Sync {
    async fn create_draw(&self, event_id: i64, input: DrawInput) -> Result<lucky_draws::Model, ServiceError>;

    async fn list_draws(&self, event_id: i64) -> Result<Vec<lucky_draws::Model>, ServiceError>;

    async fn delete_draw(&self, draw_id: i64) -> Result<(), ServiceError>;

    /// Picks a random attendee of the draw's event who has not won yet and
    /// completes the draw.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if the draw is already completed and
    /// [`ServiceError::InvalidArgument`] if nobody is eligible.
    async fn spin(&self, draw_id: i64) -> Result<SpinResult, ServiceError>;

    /// Returns a completed draw to pending and forgets its winner.
    async fn reset(&self, draw_id: i64) -> Result<lucky_draws::Model, ServiceError>;

    async fn winners(&self, event_id: i64) -> Result<Vec<WinnerRecord>, ServiceError>;
}
