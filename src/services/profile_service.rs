//! Domain service for member-submitted profile update requests.

use serde::Serialize;

use crate::entities::members;
use crate::membership::MemberPatch;
use crate::services::ServiceError;

/// A pending request with the requesting member resolved.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequestView {
    pub id: String,
    pub member_id: String,
    pub membership_id: Option<String>,
    pub member_name: String,
    pub changes: MemberPatch,
    pub created_at: String,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Files a request on behalf of the member owning `account_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] while an earlier request is still pending.
    async fn submit(&self, account_id: i64, changes: MemberPatch) -> Result<UpdateRequestView, ServiceError>;

    async fn has_pending(&self, account_id: i64) -> Result<bool, ServiceError>;

    async fn list_pending(&self) -> Result<Vec<UpdateRequestView>, ServiceError>;

    /// Applies the request to the member and marks it processed, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if the request was already processed.
    async fn approve(&self, actor: i64, request_id: i64) -> Result<members::Model, ServiceError>;
}
