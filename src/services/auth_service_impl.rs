//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Account, Store};
use crate::services::ServiceError;
use crate::services::auth_service::{AuthService, LoginResult};

pub const MIN_PASSWORD_LEN: usize = 8;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

/// Role names are short lowercase words such as `admin` or `treasurer`.
fn normalize_roles(roles: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut normalized: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles {
        let role = role.trim().to_lowercase();
        if role.is_empty() || role.len() > 32 || !role.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ServiceError::invalid(format!("Invalid role name: {role:?}")));
        }
        if !normalized.contains(&role) {
            normalized.push(role);
        }
    }
    Ok(normalized)
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ServiceError> {
        let account = self
            .store
            .accounts()
            .verify_password(username.trim(), password)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !account.is_active {
            return Err(ServiceError::Unauthorized(
                "Account is not active yet".to_string(),
            ));
        }

        Ok(LoginResult {
            api_key: account.api_key.clone(),
            account,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Account>, ServiceError> {
        let account = self.store.accounts().verify_api_key(api_key).await?;
        Ok(account.filter(|a| a.is_active))
    }

    async fn account(&self, account_id: i64) -> Result<Account, ServiceError> {
        self.store
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", account_id))
    }

    async fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::invalid(format!(
                "New password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if current_password == new_password {
            return Err(ServiceError::invalid(
                "New password must be different from current password",
            ));
        }

        let account = self.account(account_id).await?;
        let verified = self
            .store
            .accounts()
            .verify_password(&account.username, current_password)
            .await?;

        if verified.is_none() {
            return Err(ServiceError::invalid("Current password is incorrect"));
        }

        self.store
            .accounts()
            .update_password(account_id, new_password, &self.security)
            .await?;

        tracing::info!(account_id, "Password changed");
        Ok(())
    }

    async fn regenerate_api_key(&self, account_id: i64) -> Result<String, ServiceError> {
        let account = self.account(account_id).await?;
        let key = self.store.accounts().regenerate_api_key(&account.username).await?;
        tracing::info!(account_id, "API key regenerated");
        Ok(key)
    }

    async fn list_staff(&self) -> Result<Vec<Account>, ServiceError> {
        Ok(self.store.accounts().list_staff().await?)
    }

    async fn set_staff_roles(&self, username: &str, roles: Vec<String>) -> Result<Account, ServiceError> {
        let roles = normalize_roles(roles)?;
        let account = self
            .store
            .accounts()
            .set_staff_roles(username, &roles)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", username))?;

        tracing::info!(username, roles = ?account.staff_roles, "Staff roles updated");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_roles() {
        let roles = normalize_roles(vec![
            "Admin".to_string(),
            " treasurer ".to_string(),
            "admin".to_string(),
        ])
        .unwrap();
        assert_eq!(roles, vec!["admin", "treasurer"]);

        assert!(normalize_roles(vec!["drop table".to_string()]).is_err());
        assert!(normalize_roles(vec![String::new()]).is_err());
        assert!(normalize_roles(Vec::new()).unwrap().is_empty());
    }
}
