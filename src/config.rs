use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_FOOD_DATA_PATH: &str = "data/Indian_Food_Nutrition_Processed.csv";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub food_data_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("LOG_STORE")
            .unwrap_or_else(|_| "postgres".into())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreConfig::Memory,
            "postgres" => StoreConfig::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set when LOG_STORE=postgres")?,
                max_connections: std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            },
            other => anyhow::bail!("unknown LOG_STORE `{other}` (expected postgres or memory)"),
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(5001),
            store,
            food_data_path: std::env::var("FOOD_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_FOOD_DATA_PATH)),
        })
    }

    /// In-memory configuration used by tests and `AppState::fake`.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreConfig::Memory,
            food_data_path: PathBuf::from(DEFAULT_FOOD_DATA_PATH),
        }
    }
}
