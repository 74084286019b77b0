use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::coach::ChatSessions;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub chat_sessions: ChatSessions,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self {
            db,
            config,
            http: reqwest::Client::new(),
            chat_sessions: ChatSessions::default(),
        })
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            config,
            http: reqwest::Client::new(),
            chat_sessions: ChatSessions::default(),
        }
    }

    /// State backed by a lazily connecting pool, for unit tests that never
    /// execute a query.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool should construct");
        Self::from_parts(db, config)
    }
}
