use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts;

/// Account data returned from repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub api_key: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub staff_roles: Vec<String>,
    pub must_change_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            staff_roles: parse_roles(&model.staff_roles),
            username: model.username,
            email: model.email,
            api_key: model.api_key,
            is_active: model.is_active,
            is_superuser: model.is_superuser,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Roles are stored as a JSON array; anything unreadable counts as no roles.
#[must_use]
pub fn parse_roles(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account by username")?;

        Ok(account.map(Account::from))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(account.map(Account::from))
    }

    /// Looks an account up by username or email, for password recovery.
    pub async fn find_for_recovery(&self, identifier: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(
                Condition::any()
                    .add(accounts::Column::Username.eq(identifier))
                    .add(accounts::Column::Email.eq(identifier)),
            )
            .order_by_asc(accounts::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query account for recovery")?;

        Ok(account.map(Account::from))
    }

    /// Verify a password and return the account when it matches.
    /// Argon2 runs on the blocking pool.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account for password verification")?;

        let Some(account) = account else {
            return Ok(None);
        };

        let password_hash = account.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| Account::from(account)))
    }

    /// Replace the password hash of an account, on any connection or transaction.
    pub async fn set_password_hash<C: ConnectionTrait>(
        conn: &C,
        account_id: i64,
        password_hash: String,
    ) -> Result<()> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await
            .context("Failed to query account for password update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {account_id}"))?;

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(password_hash);
        active.must_change_password = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(conn).await?;

        Ok(())
    }

    pub async fn update_password(
        &self,
        account_id: i64,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let hash = hash_password_blocking(new_password, config).await?;
        Self::set_password_hash(&self.conn, account_id, hash).await
    }

    /// Verify API key and return the associated account
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query account by API key")?;

        Ok(account.map(Account::from))
    }

    pub async fn regenerate_api_key(&self, username: &str) -> Result<String> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account for API key regeneration")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {username}"))?;

        let new_api_key = generate_api_key();

        let mut active: accounts::ActiveModel = account.into();
        active.api_key = Set(new_api_key.clone());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(new_api_key)
    }

    /// Accounts with the superuser flag or at least one staff role.
    pub async fn list_staff(&self) -> Result<Vec<Account>> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list staff accounts")?;

        Ok(rows
            .into_iter()
            .map(Account::from)
            .filter(|a| a.is_superuser || !a.staff_roles.is_empty())
            .collect())
    }

    pub async fn set_staff_roles(&self, username: &str, roles: &[String]) -> Result<Option<Account>> {
        let Some(account) = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account for role update")?
        else {
            return Ok(None);
        };

        let mut active: accounts::ActiveModel = account.into();
        active.staff_roles = Set(serde_json::to_string(roles)?);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        Ok(Some(Account::from(updated)))
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    random_hex::<32>()
}

/// Hex-encode `N` random bytes.
#[must_use]
pub fn random_hex<const N: usize>() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; N] = rng.random();

    bytes.iter().fold(String::with_capacity(N * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key_shape() {
        let key = generate_api_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn test_parse_roles() {
        assert_eq!(parse_roles(r#"["admin","cashier"]"#), vec!["admin", "cashier"]);
        assert!(parse_roles("").is_empty());
        assert!(parse_roles("not json").is_empty());
    }

    #[test]
    fn test_hash_password_verifies() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let hash = hash_password("s3cret-pass", &config).unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"s3cret-pass", &parsed)
                .is_ok()
        );
    }
}
