//! `SeaORM` implementation of the `MembershipService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, SecurityConfig};
use crate::db::repositories::account::{generate_api_key, hash_password_blocking};
use crate::db::{MemberCounts, MemberFilter, Store, ZoneCount};
use crate::entities::accounts;
use crate::entities::members::{self, MemberStatus};
use crate::ledger::{self, AuditAction, AuditEntry, Stamp};
use crate::membership::patch::is_valid_email;
use crate::membership::{IdFormat, MemberPatch, is_unassigned, next_membership_id};
use crate::services::mailer::{self, Mailer};
use crate::services::membership_service::{
    ApprovalOutcome, ApprovalRequest, MembershipService, RegistrationRequest,
};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmMembershipService {
    store: Store,
    security: SecurityConfig,
    format: IdFormat,
    attempts: u32,
    timeout: Duration,
    organisation: String,
    mailer: Arc<dyn Mailer>,
}

struct Transition {
    member: members::Model,
    previous: MemberStatus,
    allocated: Option<String>,
}

impl SeaOrmMembershipService {
    #[must_use]
    pub fn new(store: Store, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            security: config.security.clone(),
            format: IdFormat::members(&config.membership),
            attempts: config.membership.allocation_attempts.max(1),
            timeout: config.server.request_timeout(),
            organisation: config.mail.organisation.clone(),
            mailer,
        }
    }

    async fn apply_transition(
        &self,
        actor: i64,
        member_id: i64,
        request: &ApprovalRequest,
    ) -> Result<Transition, ServiceError> {
        let (_write, txn) = self.store.begin_write().await?;

        let member = members::Entity::find_by_id(member_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", member_id))?;

        let previous = member.status;
        let target = request.status;
        let now = chrono::Utc::now().to_rfc3339();

        let allocated = if target == MemberStatus::Approved
            && is_unassigned(member.membership_id.as_deref())
        {
            Some(next_membership_id(&txn, &self.format).await?)
        } else {
            None
        };

        let account_id = member.account_id;
        let never_approved = member.approved_at.is_none();

        let mut active: members::ActiveModel = member.into();
        request.changes.apply(&mut active);
        active.status = Set(target);
        if let Some(id) = &allocated {
            active.membership_id = Set(Some(id.clone()));
        }
        if target == MemberStatus::Approved && never_approved {
            active.approved_at = Set(Some(now.clone()));
        }
        active.updated_at = Set(now.clone());
        let updated = active.update(&txn).await?;

        let account = accounts::Entity::find_by_id(account_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", account_id))?;

        let mut account: accounts::ActiveModel = account.into();
        if let Some(id) = &allocated {
            account.username = Set(id.clone());
        }
        match target {
            MemberStatus::Approved => account.is_active = Set(true),
            MemberStatus::Inactive => account.is_active = Set(false),
            MemberStatus::Pending | MemberStatus::Rejected => {}
        }
        if account.is_changed() {
            account.updated_at = Set(now);
            account.update(&txn).await?;
        }

        let action = if target == MemberStatus::Approved && previous != MemberStatus::Approved {
            AuditAction::Approved
        } else {
            AuditAction::Modified
        };
        ledger::append::<members::Entity, _>(&txn, &updated, &Stamp::now(action, actor)).await?;

        txn.commit().await?;

        Ok(Transition {
            member: updated,
            previous,
            allocated,
        })
    }

    /// Retries lost identifier races and a database still busy with another
    /// process's writer; every other error is final.
    async fn transition_with_retry(
        &self,
        actor: i64,
        member_id: i64,
        request: &ApprovalRequest,
    ) -> Result<Transition, ServiceError> {
        let mut attempt = 1;
        loop {
            match self.apply_transition(actor, member_id, request).await {
                Err(ServiceError::Conflict(msg))
                    if attempt < self.attempts && is_identifier_race(&msg) =>
                {
                    warn!(member_id, attempt, error = %msg, "Membership ID collision, retrying");
                    attempt += 1;
                }
                Err(err) if attempt < self.attempts && err.is_busy() => {
                    warn!(member_id, attempt, error = %err, "Database busy, retrying approval");
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn notify_approved(&self, member: &members::Model) -> bool {
        let (Some(email), Some(membership_id)) = (
            member.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            member.membership_id.as_deref(),
        ) else {
            return false;
        };

        mailer::dispatch(
            self.mailer.clone(),
            mailer::approval_mail(&self.organisation, email, &member.full_name(), membership_id),
        );
        true
    }
}

fn is_identifier_race(msg: &str) -> bool {
    msg.contains("membership_id") || msg.contains("username")
}

fn validate_registration(request: &RegistrationRequest) -> Result<(), ServiceError> {
    let civil_id = request.civil_id.trim();
    if civil_id.is_empty() || !civil_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::invalid("Civil ID must be a non-empty alphanumeric value"));
    }
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(ServiceError::invalid("First and last name are required"));
    }
    if request.password.len() < 8 {
        return Err(ServiceError::invalid("Password must be at least 8 characters"));
    }
    if let Some(username) = &request.username
        && username.trim().is_empty()
    {
        return Err(ServiceError::invalid("Username cannot be blank"));
    }
    if let Some(email) = request.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
        && !is_valid_email(email)
    {
        return Err(ServiceError::invalid(format!("Invalid email address: {email}")));
    }
    request.profile.validate()
}

#[async_trait]
impl MembershipService for SeaOrmMembershipService {
    async fn register(&self, request: RegistrationRequest) -> Result<members::Model, ServiceError> {
        validate_registration(&request)?;

        let password_hash = hash_password_blocking(&request.password, &self.security).await?;
        let civil_id = request.civil_id.trim().to_string();
        let username = request
            .username
            .as_deref()
            .map_or_else(|| civil_id.clone(), |u| u.trim().to_string());
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(ToString::to_string);

        let work = async {
            let (_write, txn) = self.store.begin_write().await?;
            let now = chrono::Utc::now().to_rfc3339();

            let account = accounts::ActiveModel {
                username: Set(username.clone()),
                email: Set(email.clone()),
                password_hash: Set(password_hash),
                api_key: Set(generate_api_key()),
                is_active: Set(false),
                is_superuser: Set(false),
                staff_roles: Set("[]".to_string()),
                must_change_password: Set(false),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            let mut member = members::ActiveModel {
                account_id: Set(account.id),
                membership_id: Set(None),
                status: Set(MemberStatus::Pending),
                civil_id: Set(civil_id.clone()),
                first_name: Set(request.first_name.trim().to_string()),
                middle_name: Set(None),
                last_name: Set(request.last_name.trim().to_string()),
                email: Set(email),
                approved_at: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            request.profile.apply(&mut member);
            if let Some(middle) = request.middle_name.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
                member.middle_name = Set(Some(middle.to_string()));
            }
            let member = member.insert(&txn).await?;

            ledger::append::<members::Entity, _>(
                &txn,
                &member,
                &Stamp::now(AuditAction::Created, account.id),
            )
            .await?;

            txn.commit().await?;
            Ok(member)
        };

        let member = with_deadline(self.timeout, work).await?;
        info!(member_id = member.id, civil_id = %member.civil_id, "Member registered");
        Ok(member)
    }

    async fn approve(
        &self,
        actor: i64,
        member_id: i64,
        request: ApprovalRequest,
    ) -> Result<ApprovalOutcome, ServiceError> {
        request.changes.validate()?;

        let transition = with_deadline(
            self.timeout,
            self.transition_with_retry(actor, member_id, &request),
        )
        .await?;

        if let Some(id) = &transition.allocated {
            metrics::counter!("membership_ids_allocated_total").increment(1);
            info!(member_id, membership_id = %id, actor, "Membership ID assigned");
        }

        let entered_approved = transition.member.status == MemberStatus::Approved
            && transition.previous != MemberStatus::Approved;
        let notified = entered_approved && self.notify_approved(&transition.member);

        info!(
            member_id,
            from = transition.previous.as_str(),
            to = transition.member.status.as_str(),
            actor,
            "Member status updated"
        );

        Ok(ApprovalOutcome {
            member: transition.member,
            allocated: transition.allocated,
            notified,
        })
    }

    async fn update_profile(
        &self,
        actor: i64,
        member_id: i64,
        patch: MemberPatch,
    ) -> Result<members::Model, ServiceError> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(ServiceError::invalid("No profile changes supplied"));
        }

        with_deadline(
            self.timeout,
            ledger::commit::<members::Entity, _>(&self.store, AuditAction::Modified, actor, move |txn| {
                Box::pin(async move {
                    let member = members::Entity::find_by_id(member_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Member", member_id))?;

                    let mut active: members::ActiveModel = member.into();
                    patch.apply(&mut active);
                    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
                    Ok(active.update(txn).await?)
                })
            }),
        )
        .await
    }

    async fn get(&self, member_id: i64) -> Result<members::Model, ServiceError> {
        self.store
            .members()
            .get(member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", member_id))
    }

    async fn get_by_membership_id(&self, membership_id: &str) -> Result<members::Model, ServiceError> {
        self.store
            .members()
            .get_by_membership_id(membership_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", membership_id))
    }

    async fn get_by_account(&self, account_id: i64) -> Result<members::Model, ServiceError> {
        self.store
            .members()
            .get_by_account(account_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No member profile for this account".to_string()))
    }

    async fn list_pending(&self) -> Result<Vec<members::Model>, ServiceError> {
        Ok(self.store.members().list_pending().await?)
    }

    async fn list(&self, filter: MemberFilter) -> Result<Vec<members::Model>, ServiceError> {
        Ok(self.store.members().list(&filter).await?)
    }

    async fn counts(&self) -> Result<MemberCounts, ServiceError> {
        Ok(self.store.members().counts().await?)
    }

    async fn zone_counts(&self) -> Result<Vec<ZoneCount>, ServiceError> {
        Ok(self.store.members().zone_counts().await?)
    }

    async fn history(&self, member_id: i64) -> Result<Vec<AuditEntry>, ServiceError> {
        self.get(member_id).await?;
        ledger::history::<members::Entity, _>(&self.store.conn, member_id).await
    }

    async fn preview_next_id(&self) -> Result<String, ServiceError> {
        next_membership_id(&self.store.conn, &self.format).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            civil_id: "12345".to_string(),
            password: "longenough".to_string(),
            username: None,
            first_name: "Anu".to_string(),
            middle_name: None,
            last_name: "Nair".to_string(),
            email: Some("anu@example.org".to_string()),
            profile: MemberPatch::default(),
        }
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&request()).is_ok());

        let mut bad = request();
        bad.civil_id = "12 34".to_string();
        assert!(validate_registration(&bad).is_err());

        let mut bad = request();
        bad.password = "short".to_string();
        assert!(validate_registration(&bad).is_err());

        let mut bad = request();
        bad.email = Some("nope".to_string());
        assert!(validate_registration(&bad).is_err());
    }

    #[test]
    fn test_identifier_race_detection() {
        assert!(is_identifier_race("Duplicate value: UNIQUE constraint failed: members.membership_id"));
        assert!(is_identifier_race("Duplicate value: UNIQUE constraint failed: accounts.username"));
        assert!(!is_identifier_race("Duplicate value: UNIQUE constraint failed: members.civil_id"));
    }
}
