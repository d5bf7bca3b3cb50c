//! Password reset tokens: `issued -> consumed` or `issued -> expired`.
//!
//! Tokens live in the database so every instance sees the same set.
//! Consumption is a compare-and-delete: of two concurrent resets with the
//! same token exactly one succeeds.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{Config, SecurityConfig};
use crate::db::repositories::account::hash_password_blocking;
use crate::db::{AccountRepository, ResetTokenRepository, Store};
use crate::entities::password_reset_tokens;
use crate::services::auth_service_impl::MIN_PASSWORD_LEN;
use crate::services::mailer::{self, Mailer};
use crate::services::{ServiceError, with_deadline};

pub struct PasswordResetService {
    store: Store,
    security: SecurityConfig,
    ttl: Duration,
    reset_url: String,
    organisation: String,
    timeout: Duration,
    mailer: Arc<dyn Mailer>,
}

/// Expired tokens are kept this long so `verify` can still tell them apart
/// from unknown ones.
const PURGE_GRACE: Duration = Duration::from_secs(24 * 60 * 60);

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn is_expired(token: &password_reset_tokens::Model) -> bool {
    token.expires_at <= now_ms()
}

impl PasswordResetService {
    #[must_use]
    pub fn new(store: Store, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            security: config.security.clone(),
            ttl: Duration::from_secs(config.password_reset.token_ttl_seconds),
            reset_url: config.password_reset.reset_url.clone(),
            organisation: config.mail.organisation.clone(),
            timeout: config.server.request_timeout(),
            mailer,
        }
    }

    /// Issue a token for an account, revoking any earlier one.
    pub async fn issue(&self, account_id: i64) -> Result<String, ServiceError> {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_ms().saturating_add(ttl_ms);
        with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;
            let token = ResetTokenRepository::issue(&txn, account_id, expires_at).await?;
            txn.commit().await?;
            Ok(token)
        })
        .await
    }

    /// Look up the account by username or email and mail it a reset link.
    /// Succeeds whether or not the account exists.
    pub async fn request(&self, identifier: &str) -> Result<(), ServiceError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ServiceError::invalid("Username or email is required"));
        }

        let Some(account) = self.store.accounts().find_for_recovery(identifier).await? else {
            info!("Password reset requested for unknown account");
            return Ok(());
        };

        let member = self.store.members().get_by_account(account.id).await?;
        let email = account
            .email
            .clone()
            .or_else(|| member.as_ref().and_then(|m| m.email.clone()))
            .filter(|e| !e.trim().is_empty());

        let Some(email) = email else {
            info!(account_id = account.id, "Password reset requested but account has no email");
            return Ok(());
        };

        let token = self.issue(account.id).await?;
        let link = format!("{}?token={token}", self.reset_url);
        let name = member.map_or_else(|| account.username.clone(), |m| m.full_name());

        mailer::dispatch(
            self.mailer.clone(),
            mailer::reset_mail(&self.organisation, &email, &name, &link, self.ttl.as_secs() / 60),
        );

        info!(account_id = account.id, "Password reset token issued");
        Ok(())
    }

    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown token and
    /// [`ServiceError::InvalidArgument`] for an expired one, which is discarded.
    pub async fn verify(&self, token: &str) -> Result<(), ServiceError> {
        let found = self
            .store
            .reset_tokens()
            .peek(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid reset token".to_string()))?;

        if is_expired(&found) {
            ResetTokenRepository::take(&self.store.conn, token).await?;
            return Err(ServiceError::invalid("Reset token has expired"));
        }

        Ok(())
    }

    /// Consume `token` and set the account's password.
    pub async fn reset(&self, token: &str, new_password: &str) -> Result<(), ServiceError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hash = hash_password_blocking(new_password, &self.security).await?;

        let account_id = with_deadline(self.timeout, async {
            let (_write, txn) = self.store.begin_write().await?;

            let claimed = ResetTokenRepository::take(&txn, token)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Invalid reset token".to_string()))?;

            if is_expired(&claimed) {
                txn.commit().await?;
                return Err(ServiceError::invalid("Reset token has expired"));
            }

            AccountRepository::set_password_hash(&txn, claimed.account_id, hash).await?;
            txn.commit().await?;
            Ok(claimed.account_id)
        })
        .await?;

        info!(account_id, "Password reset completed");
        Ok(())
    }

    /// Drop tokens that expired more than [`PURGE_GRACE`] ago.
    pub async fn purge_expired(&self) -> Result<u64, ServiceError> {
        let grace_ms = i64::try_from(PURGE_GRACE.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_ms().saturating_sub(grace_ms);
        Ok(self.store.reset_tokens().purge_expired(cutoff).await?)
    }
}
