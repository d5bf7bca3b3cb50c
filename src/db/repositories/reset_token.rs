use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use crate::entities::password_reset_tokens;

use super::account::random_hex;

pub struct ResetTokenRepository {
    conn: DatabaseConnection,
}

impl ResetTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Store a fresh token for the account on `txn`, replacing any it already
    /// had. The caller commits.
    pub async fn issue<C: ConnectionTrait>(
        txn: &C,
        account_id: i64,
        expires_at_ms: i64,
    ) -> Result<String> {
        let token = random_hex::<32>();

        password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::AccountId.eq(account_id))
            .exec(txn)
            .await
            .context("Failed to revoke previous reset tokens")?;

        password_reset_tokens::ActiveModel {
            token: Set(token.clone()),
            account_id: Set(account_id),
            expires_at: Set(expires_at_ms),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(txn)
        .await
        .context("Failed to store reset token")?;

        Ok(token)
    }

    pub async fn peek(&self, token: &str) -> Result<Option<password_reset_tokens::Model>> {
        password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query reset token")
    }

    /// Atomically claim a token: whoever deletes the row owns it.
    /// Returns `None` when the token is unknown or another caller claimed it first.
    pub async fn take<C: ConnectionTrait>(
        conn: &C,
        token: &str,
    ) -> Result<Option<password_reset_tokens::Model>> {
        let Some(row) = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .one(conn)
            .await
            .context("Failed to query reset token")?
        else {
            return Ok(None);
        };

        let deleted = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .exec(conn)
            .await
            .context("Failed to consume reset token")?;

        Ok((deleted.rows_affected == 1).then_some(row))
    }

    /// Delete tokens that expired strictly before `cutoff_ms`.
    pub async fn purge_expired(&self, cutoff_ms: i64) -> Result<u64> {
        let result = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::ExpiresAt.lt(cutoff_ms))
            .exec(&self.conn)
            .await
            .context("Failed to purge expired reset tokens")?;

        Ok(result.rows_affected)
    }
}
