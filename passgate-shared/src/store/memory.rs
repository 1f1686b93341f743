/// In-memory user store
///
/// Keeps records in a map behind a Tokio `RwLock`. Uniqueness is checked
/// inside the write lock, so concurrent inserts for one identity cannot both
/// succeed. Clones share the same map.

use super::{StoreError, UserStore};
use crate::models::user::{Identity, NewUser, UserChanges, UserRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.identity == identity).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.identity == user.identity) {
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            identity: user.identity,
            secret_hash: user.secret_hash,
            profile: user.profile,
            created_at: now,
            updated_at: now,
        };

        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|record| {
            changes.apply_to(record);
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::SecretHash;
    use crate::models::user::Profile;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            identity: Identity::new(email),
            secret_hash: SecretHash::from_stored("$argon2id$stub".to_string()),
            profile: Profile::new("Test", "User"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryUserStore::new();
        let inserted = store.insert(new_user("a@b.com")).await.unwrap();

        let by_identity = store
            .find_by_identity(&Identity::new("A@B.com"))
            .await
            .unwrap()
            .expect("Should find by normalized identity");
        assert_eq!(by_identity.id, inserted.id);

        let by_id = store.find_by_id(inserted.id).await.unwrap();
        assert!(by_id.is_some());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = MemoryUserStore::new();
        store.insert(new_user("a@b.com")).await.unwrap();

        let result = store.insert(new_user(" A@B.COM ")).await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_one_winner() {
        let store = MemoryUserStore::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(new_user("race@b.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryUserStore::new();
        let result = store.update(Uuid::new_v4(), UserChanges::default()).await.unwrap();
        assert!(result.is_none());
    }
}
