//! `SeaORM` implementation of the `NonMemberService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::time::Duration;

use crate::db::{NonMemberFilter, Store};
use crate::entities::non_members;
use crate::ledger::{self, AuditAction, AuditEntry, Cascade};
use crate::services::non_member_service::{NonMemberInput, NonMemberService};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmNonMemberService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmNonMemberService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn fill(active: &mut non_members::ActiveModel, input: NonMemberInput) {
    active.full_name = Set(input.full_name.trim().to_string());
    active.is_company = Set(input.is_company);
    active.company_name = Set(trimmed(input.company_name).filter(|_| input.is_company));
    active.email = Set(trimmed(input.email));
    active.phone = Set(trimmed(input.phone));
    active.address = Set(trimmed(input.address));
    active.remarks = Set(trimmed(input.remarks));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
}

#[async_trait]
impl NonMemberService for SeaOrmNonMemberService {
    async fn create(&self, actor: i64, input: NonMemberInput) -> Result<non_members::Model, ServiceError> {
        input.validate()?;

        let created = with_deadline(
            self.timeout,
            ledger::commit::<non_members::Entity, _>(&self.store, AuditAction::Created, actor, move |txn| {
                Box::pin(async move {
                    let mut active = non_members::ActiveModel {
                        created_at: Set(chrono::Utc::now().to_rfc3339()),
                        ..Default::default()
                    };
                    fill(&mut active, input);
                    Ok(active.insert(txn).await?)
                })
            }),
        )
        .await?;

        tracing::info!(non_member_id = created.id, actor, "Non-member created");
        Ok(created)
    }

    async fn update(
        &self,
        actor: i64,
        id: i64,
        input: NonMemberInput,
    ) -> Result<non_members::Model, ServiceError> {
        input.validate()?;

        with_deadline(
            self.timeout,
            ledger::commit::<non_members::Entity, _>(&self.store, AuditAction::Modified, actor, move |txn| {
                Box::pin(async move {
                    let existing = non_members::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Non-member", id))?;

                    let mut active: non_members::ActiveModel = existing.into();
                    fill(&mut active, input);
                    Ok(active.update(txn).await?)
                })
            }),
        )
        .await
    }

    async fn get(&self, id: i64) -> Result<non_members::Model, ServiceError> {
        self.store
            .non_members()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Non-member", id))
    }

    async fn list(&self, filter: NonMemberFilter) -> Result<Vec<non_members::Model>, ServiceError> {
        Ok(self.store.non_members().list(&filter).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        with_deadline(
            self.timeout,
            ledger::delete::<non_members::Entity>(&self.store, id, Cascade::AuditsFirst),
        )
        .await
    }

    async fn history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError> {
        self.get(id).await?;
        ledger::history::<non_members::Entity, _>(&self.store.conn, id).await
    }
}
