use crate::config::{Config, HomeWindow};
use crate::db::{MemoryStore, PgStore, SurveyStore, init_db, pool_stats};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SurveyStore>,
    pub home: HomeWindow,
}

impl AppState {
    pub fn new(store: Arc<dyn SurveyStore>, home: HomeWindow) -> Self {
        AppState { store, home }
    }

    /// Connects to Postgres when a URL is configured, otherwise falls back
    /// to an empty in-memory store.
    pub async fn from_config(config: &Config) -> Result<Self, sqlx::Error> {
        let store: Arc<dyn SurveyStore> = match &config.database_url {
            Some(url) => {
                let pool = init_db(url, config.max_connections).await?;
                info!("{}", pool_stats(&pool));
                Arc::new(PgStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set, surveys will not outlive this process");
                Arc::new(MemoryStore::default())
            }
        };

        info!(backend = store.backend_tag(), "survey store ready");
        Ok(AppState::new(store, config.home))
    }
}
