use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};

/// HashMap-backed store with the same uniqueness behavior as the Postgres
/// unique indexes. Used by unit and router tests; no persistence.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a record, simulating a user deleted after a token was issued.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        self.users.write().expect("user map poisoned").remove(&id)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("user map poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("user map poisoned");
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("user map poisoned");
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().expect("user map poisoned");
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(StoreError::Duplicate);
        }
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: String::new(),
            profile_picture: String::new(),
            follower_count: 0,
            following_count: 0,
            video_count: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().expect("user map poisoned");
        if !users.contains_key(&user.id) {
            return Err(StoreError::Missing);
        }
        if users
            .values()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(StoreError::Duplicate);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
