//! In-process user store for development runs without Postgres, and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, User, UserStore};

#[derive(Default)]
struct Inner {
    last_id: i64,
    by_username: HashMap<String, User>,
}

/// Map-backed store. The write lock makes check-and-insert atomic, which is the
/// in-memory equivalent of a unique index on `username`.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.by_username.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.by_username.get(username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.by_username.values().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(username) {
            return Err(StoreError::UniqueViolation);
        }
        inner.last_id += 1;
        let user = User {
            id: inner.last_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        inner.by_username.insert(user.username.clone(), user);
        Ok(inner.last_id)
    }
}
