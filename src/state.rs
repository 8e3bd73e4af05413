use std::sync::Arc;

use crate::config::{AppConfig, JwtConfig};
use crate::store::{InMemoryUserStore, PostgresUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = PostgresUserStore::connect(&config.database_url).await?;

        if let Err(e) = sqlx::migrate!("./migrations").run(store.pool()).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// In-memory state with a fixed secret, for tests and local tinkering.
    pub fn fake() -> Self {
        Self {
            store: Arc::new(InMemoryUserStore::new()),
            config: Arc::new(AppConfig {
                database_url: "postgres://localhost:5432/booktalk_test".into(),
                jwt: JwtConfig {
                    secret: "test-secret".into(),
                    ttl_hours: 1,
                },
            }),
        }
    }
}
