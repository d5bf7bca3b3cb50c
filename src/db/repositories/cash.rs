use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::entities::{box_collections, cash_boxes};

#[derive(Debug, Clone, Default)]
pub struct BoxFilter {
    pub in_use: Option<bool>,
    /// Substring of the box number
    pub number: Option<String>,
    pub member_id: Option<i64>,
    pub non_member_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BoxStats {
    pub total: u64,
    pub in_use: u64,
}

pub struct CashRepository {
    conn: DatabaseConnection,
}

impl CashRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_box(&self, id: i64) -> Result<Option<cash_boxes::Model>> {
        cash_boxes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query cash box")
    }

    pub async fn get_box_by_number(&self, number: &str) -> Result<Option<cash_boxes::Model>> {
        cash_boxes::Entity::find()
            .filter(cash_boxes::Column::Number.eq(number))
            .one(&self.conn)
            .await
            .context("Failed to query cash box by number")
    }

    pub async fn list_boxes(&self, filter: &BoxFilter) -> Result<Vec<cash_boxes::Model>> {
        let mut query = cash_boxes::Entity::find();

        if let Some(in_use) = filter.in_use {
            query = query.filter(cash_boxes::Column::InUse.eq(in_use));
        }
        if let Some(number) = filter.number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(cash_boxes::Column::Number.contains(number));
        }
        if let Some(member_id) = filter.member_id {
            query = query.filter(cash_boxes::Column::MemberId.eq(member_id));
        }
        if let Some(non_member_id) = filter.non_member_id {
            query = query.filter(cash_boxes::Column::NonMemberId.eq(non_member_id));
        }

        query
            .order_by_asc(cash_boxes::Column::Number)
            .all(&self.conn)
            .await
            .context("Failed to list cash boxes")
    }

    pub async fn box_stats(&self) -> Result<BoxStats> {
        let flags: Vec<bool> = cash_boxes::Entity::find()
            .select_only()
            .column(cash_boxes::Column::InUse)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count cash boxes")?;

        Ok(BoxStats {
            total: flags.len() as u64,
            in_use: flags.iter().filter(|in_use| **in_use).count() as u64,
        })
    }

    pub async fn count_collections(&self, box_id: i64) -> Result<u64> {
        box_collections::Entity::find()
            .filter(box_collections::Column::BoxId.eq(box_id))
            .count(&self.conn)
            .await
            .context("Failed to count box collections")
    }

    pub async fn get_collection(&self, id: i64) -> Result<Option<box_collections::Model>> {
        box_collections::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query box collection")
    }

    /// Collections newest first, optionally for a single box.
    pub async fn list_collections(&self, box_id: Option<i64>) -> Result<Vec<box_collections::Model>> {
        let mut query = box_collections::Entity::find();
        if let Some(box_id) = box_id {
            query = query.filter(box_collections::Column::BoxId.eq(box_id));
        }

        query
            .order_by_desc(box_collections::Column::Date)
            .order_by_desc(box_collections::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list box collections")
    }
}
