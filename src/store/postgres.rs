use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded fixed-delay retry so the process survives the
    /// database coming up slightly after it during orchestrated startup.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let mut attempt = 1u32;
        loop {
            match PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self { pool }),
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn!(error = %e, attempt, "database connect failed, retrying in 5s");
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("connect to database"));
                }
            }
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_read_err(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn map_write_err(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate;
        }
    }
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   bio, profile_picture, follower_count, following_count,
                   video_count, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_err)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   bio, profile_picture, follower_count, following_count,
                   video_count, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   bio, profile_picture, follower_count, following_count,
                   video_count, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_err)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, first_name, last_name,
                      bio, profile_picture, follower_count, following_count,
                      video_count, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4,
                bio = $5, profile_picture = $6
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name,
                      bio, profile_picture, follower_count, following_count,
                      video_count, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_err)?
        .ok_or(StoreError::Missing)
    }
}
