use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::non_members;

/// Substring filters, case-insensitive for ASCII.
#[derive(Debug, Clone, Default)]
pub struct NonMemberFilter {
    pub name: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
}

pub struct NonMemberRepository {
    conn: DatabaseConnection,
}

impl NonMemberRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i64) -> Result<Option<non_members::Model>> {
        non_members::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query non-member")
    }

    pub async fn list(&self, filter: &NonMemberFilter) -> Result<Vec<non_members::Model>> {
        let mut query = non_members::Entity::find();

        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        if let Some(name) = trimmed(&filter.name) {
            query = query.filter(non_members::Column::FullName.contains(name));
        }
        if let Some(company) = trimmed(&filter.company) {
            query = query.filter(non_members::Column::CompanyName.contains(company));
        }
        if let Some(address) = trimmed(&filter.address) {
            query = query.filter(non_members::Column::Address.contains(address));
        }

        query
            .order_by_asc(non_members::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list non-members")
    }
}
