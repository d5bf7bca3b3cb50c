//! Domain service for member registration, approval and administration.

use serde::Deserialize;

use crate::db::{MemberCounts, MemberFilter, ZoneCount};
use crate::entities::members::{self, MemberStatus};
use crate::ledger::AuditEntry;
use crate::membership::MemberPatch;
use crate::services::ServiceError;

/// Self-service application. The username defaults to the civil ID.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub civil_id: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: MemberPatch,
}

#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub status: MemberStatus,
    pub changes: MemberPatch,
}

#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub member: members::Model,
    /// Set only when this call assigned the identifier.
    pub allocated: Option<String>,
    /// Whether an approval mail was queued.
    pub notified: bool,
}

#[async_trait::async_trait]
pub trait MembershipService: Send + Sync {
    /// Creates an inactive account and a pending member in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] for a duplicate civil ID or username.
    async fn register(&self, request: RegistrationRequest) -> Result<members::Model, ServiceError>;

    /// Moves a member to `request.status`, assigning a membership identifier
    /// the first time the member is approved and renaming the account to it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the member does not exist.
    async fn approve(
        &self,
        actor: i64,
        member_id: i64,
        request: ApprovalRequest,
    ) -> Result<ApprovalOutcome, ServiceError>;

    async fn update_profile(
        &self,
        actor: i64,
        member_id: i64,
        patch: MemberPatch,
    ) -> Result<members::Model, ServiceError>;

    async fn get(&self, member_id: i64) -> Result<members::Model, ServiceError>;

    async fn get_by_membership_id(&self, membership_id: &str) -> Result<members::Model, ServiceError>;

    async fn get_by_account(&self, account_id: i64) -> Result<members::Model, ServiceError>;

    async fn list_pending(&self) -> Result<Vec<members::Model>, ServiceError>;

    async fn list(&self, filter: MemberFilter) -> Result<Vec<members::Model>, ServiceError>;

    async fn counts(&self) -> Result<MemberCounts, ServiceError>;

    async fn zone_counts(&self) -> Result<Vec<ZoneCount>, ServiceError>;

    async fn history(&self, member_id: i64) -> Result<Vec<AuditEntry>, ServiceError>;

    /// The identifier the next approval would receive, without reserving it.
    async fn preview_next_id(&self) -> Result<String, ServiceError>;
}
