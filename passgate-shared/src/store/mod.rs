/// User store abstraction
///
/// The auth service talks to persistence only through [`UserStore`]. The
/// store owns identity uniqueness: two concurrent inserts for the same
/// identity must not both succeed, whatever the caller checked beforehand.
///
/// # Implementations
///
/// - [`postgres::PgUserStore`]: sqlx + PostgreSQL, uniqueness via a `UNIQUE`
///   constraint
/// - [`memory::MemoryUserStore`]: in-process map for tests and local runs

use crate::models::user::{Identity, NewUser, UserChanges, UserRecord};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Identity uniqueness constraint rejected the write
    #[error("Identity already exists")]
    Duplicate,

    /// Backend failure (connection, I/O, unexpected constraint)
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Persistence boundary for user credential records
///
/// Every write is a single atomic operation; a dropped future never leaves
/// a partially written record behind.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a record by its normalized identity
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError>;

    /// Looks up a record by its durable ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a new record
    ///
    /// Returns `StoreError::Duplicate` if the identity is already taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Applies `changes` to the record with `id`
    ///
    /// Returns `None` if no such record exists.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError>;

    /// Checks that the backend is reachable
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
