use anyhow::{Context, Result};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, SqlxSqliteConnector,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use migrator::DEFAULT_API_KEY;
pub use repositories::account::{Account, AccountRepository};
pub use repositories::cash::{BoxFilter, BoxStats, CashRepository};
pub use repositories::event::EventRepository;
pub use repositories::member::{MemberCounts, MemberFilter, MemberRepository, ZoneCount};
pub use repositories::non_member::{NonMemberFilter, NonMemberRepository};
pub use repositories::raffle::{RaffleRepository, WinnerRecord};
pub use repositories::reset_token::ResetTokenRepository;
pub use repositories::transaction::{TransactionFilter, TransactionRepository};
pub use repositories::update_request::UpdateRequestRepository;

/// Held for the lifetime of a write transaction.
pub type WriteGuard = OwnedMutexGuard<()>;

/// How long a statement waits on another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle. Repositories are cheap views over the shared pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    writer: Arc<Mutex<()>>,
}

/// Filesystem path behind a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file(db_url: &str) -> Option<&Path> {
    if db_url.contains(":memory:") {
        return None;
    }
    let path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    Some(Path::new(path))
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Connects, creating the database file if needed, and applies migrations.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let file = sqlite_file(db_url);
        if let Some(parent) = file
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut options = SqliteConnectOptions::from_str(db_url)
            .with_context(|| format!("Invalid database url {db_url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        if file.is_some() {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }
        let options = options.disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {db_url}"))?;

        let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

        migrator::Migrator::up(&conn, None).await?;

        info!(
            pool_min = min_connections,
            pool_max = max_connections,
            "Database connected & migrations applied"
        );

        Ok(Self {
            conn,
            writer: Arc::new(Mutex::new(())),
        })
    }

    /// Opens a transaction that already holds the database write lock.
    ///
    /// Writers sharing this store queue on an in-process lock; writers in
    /// other processes are waited out through the busy timeout. Taking the
    /// lock before the first read keeps a read-then-write transaction from
    /// failing with `SQLITE_BUSY` when it upgrades.
    pub async fn begin_write(&self) -> Result<(WriteGuard, DatabaseTransaction), DbErr> {
        let guard = self.writer.clone().lock_owned().await;
        let txn = self.conn.begin().await?;
        // Any UPDATE claims the lock, even one that matches no rows
        txn.execute_unprepared("UPDATE accounts SET id = id WHERE 0")
            .await?;
        Ok((guard, txn))
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn members(&self) -> MemberRepository {
        MemberRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn reset_tokens(&self) -> ResetTokenRepository {
        ResetTokenRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn update_requests(&self) -> UpdateRequestRepository {
        UpdateRequestRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn non_members(&self) -> NonMemberRepository {
        NonMemberRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn cash(&self) -> CashRepository {
        CashRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn events(&self) -> EventRepository {
        EventRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn raffle(&self) -> RaffleRepository {
        RaffleRepository::new(self.conn.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_from_url() {
        assert_eq!(sqlite_file("sqlite::memory:"), None);
        assert_eq!(
            sqlite_file("sqlite:/var/lib/memberdesk/portal.db?mode=rwc"),
            Some(Path::new("/var/lib/memberdesk/portal.db"))
        );
        assert_eq!(
            sqlite_file("sqlite://data/portal.db"),
            Some(Path::new("data/portal.db"))
        );
    }
}
