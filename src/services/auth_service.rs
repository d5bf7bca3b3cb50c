//! Domain service for authentication and staff management.
//!
//! Handles login, password changes, API keys and staff role assignment.

use serde::Serialize;

use crate::db::Account;
use crate::services::ServiceError;

/// Account info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub staff_roles: Vec<String>,
    pub must_change_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Account> for UserInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username,
            email: account.email,
            is_active: account.is_active,
            is_superuser: account.is_superuser,
            staff_roles: account.staff_roles,
            must_change_password: account.must_change_password,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Login result containing the account and its API key.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub account: Account,
    pub api_key: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials of an active account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] if the credentials are wrong or
    /// the account has not been activated.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ServiceError>;

    /// Returns the active account owning `api_key`, if any.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Account>, ServiceError>;

    async fn account(&self, account_id: i64) -> Result<Account, ServiceError>;

    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidArgument`] if the current password is
    /// incorrect or the new one is too weak.
    async fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError>;

    async fn regenerate_api_key(&self, account_id: i64) -> Result<String, ServiceError>;

    async fn list_staff(&self) -> Result<Vec<Account>, ServiceError>;

    /// Replaces the role list of the account named `username`.
    async fn set_staff_roles(&self, username: &str, roles: Vec<String>) -> Result<Account, ServiceError>;
}
