use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::members::{self, MemberStatus};

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Defaults to approved and inactive members
    pub status: Option<MemberStatus>,
    pub zone: Option<String>,
    /// Matched against first, middle and last name
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MemberCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub inactive: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ZoneCount {
    pub zone: String,
    pub count: u64,
}

pub struct MemberRepository {
    conn: DatabaseConnection,
}

impl MemberRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i64) -> Result<Option<members::Model>> {
        members::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query member")
    }

    pub async fn get_by_account(&self, account_id: i64) -> Result<Option<members::Model>> {
        members::Entity::find()
            .filter(members::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await
            .context("Failed to query member by account")
    }

    pub async fn get_by_membership_id(&self, membership_id: &str) -> Result<Option<members::Model>> {
        members::Entity::find()
            .filter(members::Column::MembershipId.eq(membership_id))
            .one(&self.conn)
            .await
            .context("Failed to query member by membership ID")
    }

    /// Applications waiting for review, newest first.
    pub async fn list_pending(&self) -> Result<Vec<members::Model>> {
        members::Entity::find()
            .filter(members::Column::Status.eq(MemberStatus::Pending))
            .order_by_desc(members::Column::CreatedAt)
            .order_by_desc(members::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pending members")
    }

    pub async fn list(&self, filter: &MemberFilter) -> Result<Vec<members::Model>> {
        let mut query = members::Entity::find();

        query = match filter.status {
            Some(status) => query.filter(members::Column::Status.eq(status)),
            None => query.filter(
                members::Column::Status.is_in([MemberStatus::Approved, MemberStatus::Inactive]),
            ),
        };

        if let Some(zone) = filter.zone.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
            // sqlite LIKE is case-insensitive for ASCII
            query = query.filter(members::Column::Zone.like(zone));
        }

        if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(members::Column::FirstName.contains(name))
                    .add(members::Column::MiddleName.contains(name))
                    .add(members::Column::LastName.contains(name)),
            );
        }

        query
            .order_by_asc(members::Column::MembershipId)
            .order_by_asc(members::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list members")
    }

    pub async fn counts(&self) -> Result<MemberCounts> {
        let rows: Vec<MemberStatus> = members::Entity::find()
            .select_only()
            .column(members::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count members")?;

        let mut counts = MemberCounts::default();
        for status in rows {
            counts.total += 1;
            match status {
                MemberStatus::Pending => counts.pending += 1,
                MemberStatus::Approved => counts.approved += 1,
                MemberStatus::Inactive => counts.inactive += 1,
                MemberStatus::Rejected => counts.rejected += 1,
            }
        }

        Ok(counts)
    }

    /// Approved members per zone. Zones differing only in case are merged
    /// under the first spelling seen; blank zones count as "Unknown".
    pub async fn zone_counts(&self) -> Result<Vec<ZoneCount>> {
        let zones: Vec<Option<String>> = members::Entity::find()
            .select_only()
            .column(members::Column::Zone)
            .filter(members::Column::Status.eq(MemberStatus::Approved))
            .order_by_asc(members::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load member zones")?;

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, ZoneCount> = HashMap::new();

        for zone in zones {
            let label = zone
                .map(|z| z.trim().to_string())
                .filter(|z| !z.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            let key = label.to_lowercase();

            counts
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    ZoneCount {
                        zone: label,
                        count: 0,
                    }
                })
                .count += 1;
        }

        let mut result: Vec<ZoneCount> = order
            .into_iter()
            .filter_map(|key| counts.remove(&key))
            .collect();
        result.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(result)
    }
}
