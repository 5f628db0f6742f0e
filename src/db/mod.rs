//! Credential store: the `users` record contract plus Postgres and in-memory backends.

mod memory;
mod pool;
mod postgres;

pub use memory::MemoryUserStore;
pub use pool::{create_pool, DbPool};
pub use postgres::PgUserStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// A registered account. Serialized with the hash under `password`, which is what
/// `POST /auth/register` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(rename = "password")]
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The username is already present (store-level unique constraint).
    #[error("username already exists")]
    UniqueViolation,

    #[error("{0}")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Db(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for user records. Implementations must enforce username
/// uniqueness themselves and report a duplicate insert as `StoreError::UniqueViolation`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Insert a new record and return its id.
    async fn insert(&self, username: &str, password_hash: &str) -> StoreResult<i64>;
}
