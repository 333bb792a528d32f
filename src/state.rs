use crate::config::{AppConfig, StorageBackend};
use crate::generation::{GenerationGuard, PlanGenerator, StubGenerator};
use crate::storage::{KvStore, MemoryStore, PgStore};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KvStore>,
    pub generator: Arc<dyn PlanGenerator>,
    pub generation: Arc<GenerationGuard>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.storage {
            StorageBackend::Memory => {
                tracing::info!("using in-memory store");
                Arc::new(MemoryStore::new()) as Arc<dyn KvStore>
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to postgres")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
                }
                tracing::info!("using postgres store");
                Arc::new(PgStore::new(db)) as Arc<dyn KvStore>
            }
        };

        let generator =
            Arc::new(StubGenerator::new(config.generation.delay())) as Arc<dyn PlanGenerator>;

        Ok(Self::from_parts(config, store, generator))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn KvStore>,
        generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            generator,
            generation: Arc::new(GenerationGuard::new()),
        }
    }

    /// Memory store, instant generator, test config.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        let generator = Arc::new(StubGenerator::new(config.generation.delay()));
        Self::from_parts(config, Arc::new(MemoryStore::new()), generator)
    }
}
