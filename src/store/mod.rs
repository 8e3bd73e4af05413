use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub profile_picture: String,
    pub follower_count: i32,
    pub following_count: i32,
    pub video_count: i32,
    pub created_at: OffsetDateTime,
}

/// Fields supplied at registration. The id and timestamps are assigned by
/// the store; bio, picture and counters start at their defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique index rejected the write: email or username taken.
    #[error("duplicate email or username")]
    Duplicate,

    /// Write targeted a record that no longer exists.
    #[error("no such user")]
    Missing,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence interface for user records. The store's unique indexes on
/// email and username are the authority for uniqueness; callers may pre-check
/// but must handle `Duplicate` from `insert` regardless.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update(&self, user: User) -> Result<User, StoreError>;
}
