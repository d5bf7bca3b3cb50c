//! Error taxonomy shared by the domain services.

use sea_orm::{DbErr, SqlErr};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input, reported before anything is written.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or foreign-key violation.
    #[error("{0}")]
    Conflict(String),

    /// Storage or network failure.
    #[error("Storage error: {0}")]
    Io(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("{0}")]
    Unauthorized(String),
}

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// True for a storage error raised because another connection held the
    /// sqlite write lock past the busy timeout.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Io(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("database is locked") || msg.contains("database is busy")
            }
            _ => false,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                Self::Conflict(format!("Duplicate value: {msg}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                Self::Conflict(format!("Record is still referenced or references a missing record: {msg}"))
            }
            _ => {
                let msg = err.to_string();
                if msg.contains("UNIQUE constraint failed") {
                    Self::Conflict(format!("Duplicate value: {msg}"))
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    Self::Conflict(format!("Record is still referenced or references a missing record: {msg}"))
                } else {
                    Self::Io(msg)
                }
            }
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DbErr>() {
            Ok(db_err) => Self::from(db_err),
            Err(other) => Self::Io(format!("{other:#}")),
        }
    }
}

/// Run `fut` under a deadline. A transaction still open inside `fut` is
/// dropped on expiry, which rolls it back.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(ServiceError::Timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: Result<(), ServiceError> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Timeout)));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, ServiceError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_is_busy_only_matches_lock_errors() {
        let locked = ServiceError::from(DbErr::Custom("error returned from database: (code: 5) database is locked".into()));
        assert!(locked.is_busy());

        assert!(!ServiceError::Io("disk I/O error".into()).is_busy());
        assert!(!ServiceError::conflict("database is locked").is_busy());
        assert!(!ServiceError::Timeout.is_busy());
    }

    #[test]
    fn test_anyhow_wrapping_keeps_db_classification() {
        let err = anyhow::Error::new(DbErr::Custom("UNIQUE constraint failed: members.civil_id".into()))
            .context("Failed to insert member");
        assert!(matches!(ServiceError::from(err), ServiceError::Conflict(_)));

        let err = anyhow::anyhow!("disk on fire");
        assert!(matches!(ServiceError::from(err), ServiceError::Io(_)));
    }
}
