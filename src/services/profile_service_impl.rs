//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::collections::HashMap;
use std::time::Duration;

use crate::db::{Store, UpdateRequestRepository};
use crate::entities::{members, profile_update_requests};
use crate::ledger::{self, AuditAction};
use crate::membership::MemberPatch;
use crate::services::profile_service::{ProfileService, UpdateRequestView};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmProfileService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn member_for(&self, account_id: i64) -> Result<members::Model, ServiceError> {
        self.store
            .members()
            .get_by_account(account_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No member profile for this account".to_string()))
    }
}

fn parse_changes(raw: &str) -> Result<MemberPatch, ServiceError> {
    serde_json::from_str(raw)
        .map_err(|e| ServiceError::Io(format!("Stored update request is unreadable: {e}")))
}

fn view(request: &profile_update_requests::Model, member: Option<&members::Model>, changes: MemberPatch) -> UpdateRequestView {
    UpdateRequestView {
        id: request.id.to_string(),
        member_id: request.member_id.to_string(),
        membership_id: member.and_then(|m| m.membership_id.clone()),
        member_name: member.map(members::Model::full_name).unwrap_or_default(),
        changes,
        created_at: request.created_at.clone(),
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn submit(&self, account_id: i64, changes: MemberPatch) -> Result<UpdateRequestView, ServiceError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(ServiceError::invalid("No profile changes supplied"));
        }

        let member = self.member_for(account_id).await?;
        let requests = self.store.update_requests();

        if requests.has_pending(member.id).await? {
            return Err(ServiceError::conflict(
                "A profile update request is already awaiting review",
            ));
        }

        let data = serde_json::to_string(&changes)
            .map_err(|e| ServiceError::Io(format!("Failed to encode update request: {e}")))?;
        let stored = requests.create(member.id, data).await?;

        tracing::info!(member_id = member.id, request_id = stored.id, "Profile update requested");
        Ok(view(&stored, Some(&member), changes))
    }

    async fn has_pending(&self, account_id: i64) -> Result<bool, ServiceError> {
        let member = self.member_for(account_id).await?;
        Ok(self.store.update_requests().has_pending(member.id).await?)
    }

    async fn list_pending(&self) -> Result<Vec<UpdateRequestView>, ServiceError> {
        let pending = self.store.update_requests().list_pending().await?;

        let mut members_by_id: HashMap<i64, members::Model> = HashMap::new();
        for request in &pending {
            if !members_by_id.contains_key(&request.member_id)
                && let Some(member) = self.store.members().get(request.member_id).await?
            {
                members_by_id.insert(member.id, member);
            }
        }

        pending
            .iter()
            .map(|request| {
                let changes = parse_changes(&request.data)?;
                Ok(view(request, members_by_id.get(&request.member_id), changes))
            })
            .collect()
    }

    async fn approve(&self, actor: i64, request_id: i64) -> Result<members::Model, ServiceError> {
        let request = self
            .store
            .update_requests()
            .get(request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Update request", request_id))?;

        if request.processed {
            return Err(ServiceError::conflict("Update request was already processed"));
        }

        let changes = parse_changes(&request.data)?;
        changes.validate()?;
        let member_id = request.member_id;

        let member = with_deadline(
            self.timeout,
            ledger::commit::<members::Entity, _>(&self.store, AuditAction::Modified, actor, move |txn| {
                Box::pin(async move {
                    if !UpdateRequestRepository::mark_processed(txn, request_id, actor).await? {
                        return Err(ServiceError::conflict("Update request was already processed"));
                    }

                    let member = members::Entity::find_by_id(member_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Member", member_id))?;

                    let mut active: members::ActiveModel = member.into();
                    changes.apply(&mut active);
                    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
                    Ok(active.update(txn).await?)
                })
            }),
        )
        .await?;

        tracing::info!(request_id, member_id, actor, "Profile update request approved");
        Ok(member)
    }
}
