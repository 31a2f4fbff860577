use std::sync::{Arc, OnceLock};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::{AppConfig, StoreConfig};
use crate::error::AppError;
use crate::foods::FoodTable;
use crate::logs::{LogStore, MemoryLogStore, PgLogStore};
use crate::readiness::Readiness;

/// Shared handler state. The food table and log store are filled in by
/// [`AppState::load`] while the server is already accepting connections.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Arc<OnceLock<Arc<dyn LogStore>>>,
    foods: Arc<OnceLock<FoodTable>>,
    pub readiness: Arc<Readiness>,
}

impl AppState {
    /// Empty state; every gated route answers 503 until [`AppState::load`] completes.
    pub fn starting(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            store: Arc::new(OnceLock::new()),
            foods: Arc::new(OnceLock::new()),
            readiness: Arc::new(Readiness::new()),
        }
    }

    pub async fn init_with(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let state = Self::starting(config);
        state.load().await?;
        Ok(state)
    }

    /// Loads the food dataset and connects the log store concurrently, marking
    /// each readiness flag as its half completes. A store failure is fatal.
    pub async fn load(&self) -> anyhow::Result<()> {
        let foods = async {
            let path = self.config.food_data_path.clone();
            let table = tokio::task::spawn_blocking(move || FoodTable::load(&path))
                .await
                .context("load food dataset")?;
            if self.foods.set(table).is_err() {
                warn!("food table already loaded");
            }
            self.readiness.mark_reference_loaded();
            anyhow::Ok(())
        };
        let store = async {
            let store = connect_store(&self.config.store).await?;
            if self.store.set(store).is_err() {
                warn!("log store already connected");
            }
            self.readiness.mark_store_connected();
            anyhow::Ok(())
        };
        tokio::try_join!(foods, store)?;
        info!("service ready");
        Ok(())
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn LogStore>,
        foods: FoodTable,
        readiness: Arc<Readiness>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(OnceLock::from(store)),
            foods: Arc::new(OnceLock::from(foods)),
            readiness,
        }
    }

    /// Ready state over an in-memory store and the given food table.
    pub fn fake_with_foods(foods: FoodTable) -> Self {
        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryLogStore::new()),
            foods,
            Arc::new(Readiness::ready()),
        )
    }

    pub fn fake() -> Self {
        Self::fake_with_foods(FoodTable::default())
    }

    pub fn store(&self) -> Result<&dyn LogStore, AppError> {
        self.store.get().map(|s| s.as_ref()).ok_or(AppError::NotReady)
    }

    pub fn foods(&self) -> Result<&FoodTable, AppError> {
        self.foods.get().ok_or(AppError::NotReady)
    }

    /// Number of loaded dishes, 0 while loading.
    pub fn food_count(&self) -> usize {
        self.foods.get().map_or(0, FoodTable::len)
    }
}

async fn connect_store(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn LogStore>> {
    match cfg {
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let db = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("connect to database")?;

            if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                warn!(error = %e, "migration failed; continuing");
            }

            info!(max_connections, "log store connected (postgres)");
            Ok(Arc::new(PgLogStore::new(db)))
        }
        StoreConfig::Memory => {
            info!("log store is in-memory; entries are lost on restart");
            Ok(Arc::new(MemoryLogStore::new()))
        }
    }
}
