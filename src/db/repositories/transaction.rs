use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
};

use crate::entities::member_transactions;

/// Dates are `YYYY-MM-DD` and both bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub member_id: Option<i64>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TransactionFilter {
    fn apply(&self, mut query: Select<member_transactions::Entity>) -> Select<member_transactions::Entity> {
        if let Some(member_id) = self.member_id {
            query = query.filter(member_transactions::Column::MemberId.eq(member_id));
        }
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            query = query.filter(member_transactions::Column::Category.like(category));
        }
        if let Some(from) = &self.from {
            query = query.filter(member_transactions::Column::Date.gte(from.as_str()));
        }
        if let Some(to) = &self.to {
            query = query.filter(member_transactions::Column::Date.lte(to.as_str()));
        }
        query
    }
}

pub struct TransactionRepository {
    conn: DatabaseConnection,
}

impl TransactionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i64) -> Result<Option<member_transactions::Model>> {
        member_transactions::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query transaction")
    }

    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<member_transactions::Model>> {
        filter
            .apply(member_transactions::Entity::find())
            .order_by_desc(member_transactions::Column::Date)
            .order_by_desc(member_transactions::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list transactions")
    }

    pub async fn count(&self, filter: &TransactionFilter) -> Result<u64> {
        filter
            .apply(member_transactions::Entity::find())
            .count(&self.conn)
            .await
            .context("Failed to count transactions")
    }

    pub async fn for_member(&self, member_id: i64) -> Result<Vec<member_transactions::Model>> {
        self.list(&TransactionFilter {
            member_id: Some(member_id),
            ..Default::default()
        })
        .await
    }
}
