//! `SeaORM` implementation of the `RaffleService` trait.

use async_trait::async_trait;
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::time::Duration;

use crate::db::{RaffleRepository, Store, WinnerRecord};
use crate::entities::lucky_draws::{self, DrawStatus};
use crate::entities::raffle_winners;
use crate::services::raffle_service::{DrawInput, RaffleService, SpinResult};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmRaffleService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmRaffleService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn draw(&self, draw_id: i64) -> Result<lucky_draws::Model, ServiceError> {
        self.store
            .raffle()
            .get_draw(draw_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lucky draw", draw_id))
    }
}

#[async_trait]
impl RaffleService for SeaOrmRaffleService {
    async fn create_draw(&self, event_id: i64, input: DrawInput) -> Result<lucky_draws::Model, ServiceError> {
        if input.prize.trim().is_empty() {
            return Err(ServiceError::invalid("Prize is required"));
        }
        self.store
            .events()
            .get(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", event_id))?;

        let active = lucky_draws::ActiveModel {
            event_id: Set(event_id),
            prize: Set(input.prize.trim().to_string()),
            sponsor: Set(input.sponsor.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())),
            start_time: Set(input.start_time.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())),
            status: Set(DrawStatus::Pending),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        with_deadline(self.timeout, async {
            Ok(active.insert(&self.store.conn).await?)
        })
        .await
    }

    async fn list_draws(&self, event_id: i64) -> Result<Vec<lucky_draws::Model>, ServiceError> {
        Ok(self.store.raffle().list_draws(event_id).await?)
    }

    async fn delete_draw(&self, draw_id: i64) -> Result<(), ServiceError> {
        with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;

            raffle_winners::Entity::delete_many()
                .filter(raffle_winners::Column::DrawId.eq(draw_id))
                .exec(&txn)
                .await?;

            let deleted = lucky_draws::Entity::delete_by_id(draw_id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(ServiceError::not_found("Lucky draw", draw_id));
            }

            txn.commit().await?;
            Ok(())
        })
        .await
    }

    async fn spin(&self, draw_id: i64) -> Result<SpinResult, ServiceError> {
        let result = with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;

            let draw = lucky_draws::Entity::find_by_id(draw_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Lucky draw", draw_id))?;

            if draw.status == DrawStatus::Completed {
                return Err(ServiceError::conflict("Draw already has a winner; reset it first"));
            }

            let mut pool = RaffleRepository::eligible_attendees(&txn, draw.event_id).await?;
            if pool.is_empty() {
                return Err(ServiceError::invalid("No eligible attendees for this draw"));
            }

            let participants = i32::try_from(pool.len()).unwrap_or(i32::MAX);
            let pick = rand::rng().random_range(0..pool.len());
            let winner = pool.swap_remove(pick);

            raffle_winners::ActiveModel {
                draw_id: Set(draw.id),
                attendee_id: Set(winner.id),
                participants: Set(participants),
                won_at: Set(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            let mut active: lucky_draws::ActiveModel = draw.into();
            active.status = Set(DrawStatus::Completed);
            let draw = active.update(&txn).await?;

            txn.commit().await?;

            Ok(SpinResult {
                draw,
                winner,
                participants,
            })
        })
        .await?;

        tracing::info!(
            draw_id,
            attendee_id = result.winner.id,
            participants = result.participants,
            "Lucky draw spun"
        );
        Ok(result)
    }

    async fn reset(&self, draw_id: i64) -> Result<lucky_draws::Model, ServiceError> {
        let draw = self.draw(draw_id).await?;

        with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;

            raffle_winners::Entity::delete_many()
                .filter(raffle_winners::Column::DrawId.eq(draw_id))
                .exec(&txn)
                .await?;

            let mut active: lucky_draws::ActiveModel = draw.into();
            active.status = Set(DrawStatus::Pending);
            let draw = active.update(&txn).await?;

            txn.commit().await?;
            Ok(draw)
        })
        .await
    }

    async fn winners(&self, event_id: i64) -> Result<Vec<WinnerRecord>, ServiceError> {
        Ok(self.store.raffle().winners_for_event(event_id).await?)
    }
}
