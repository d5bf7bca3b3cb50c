use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};

use crate::entities::profile_update_requests;

pub struct UpdateRequestRepository {
    conn: DatabaseConnection,
}

impl UpdateRequestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i64) -> Result<Option<profile_update_requests::Model>> {
        profile_update_requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query update request")
    }

    pub async fn create(&self, member_id: i64, data: String) -> Result<profile_update_requests::Model> {
        profile_update_requests::ActiveModel {
            member_id: Set(member_id),
            data: Set(data),
            processed: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to store update request")
    }

    /// Unprocessed requests, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<profile_update_requests::Model>> {
        profile_update_requests::Entity::find()
            .filter(profile_update_requests::Column::Processed.eq(false))
            .order_by_asc(profile_update_requests::Column::CreatedAt)
            .order_by_asc(profile_update_requests::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list update requests")
    }

    pub async fn has_pending(&self, member_id: i64) -> Result<bool> {
        let count = profile_update_requests::Entity::find()
            .filter(profile_update_requests::Column::MemberId.eq(member_id))
            .filter(profile_update_requests::Column::Processed.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to count update requests")?;

        Ok(count > 0)
    }

    /// Flip an unprocessed request to processed. Returns `false` when it was
    /// already processed, so two approvals cannot both apply it.
    pub async fn mark_processed<C: ConnectionTrait>(conn: &C, id: i64, processed_by: i64) -> Result<bool> {
        let result = profile_update_requests::Entity::update_many()
            .col_expr(profile_update_requests::Column::Processed, Expr::value(true))
            .col_expr(profile_update_requests::Column::ProcessedBy, Expr::value(processed_by))
            .col_expr(
                profile_update_requests::Column::ProcessedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(profile_update_requests::Column::Id.eq(id))
            .filter(profile_update_requests::Column::Processed.eq(false))
            .exec(conn)
            .await
            .context("Failed to mark update request processed")?;

        Ok(result.rows_affected == 1)
    }
}
