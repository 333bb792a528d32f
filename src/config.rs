use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "postgres" | "pg" => Ok(Self::Postgres),
            other => anyhow::bail!("unknown STORAGE_BACKEND: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub delay_ms: u64,
    pub timeout_ms: u64,
}

impl GenerationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub default_user_id: String,
    pub generation: GenerationConfig,
    pub calorie_floor_kcal: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = match std::env::var("STORAGE_BACKEND") {
            Ok(v) => StorageBackend::parse(&v)?,
            Err(_) => StorageBackend::Memory,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORAGE_BACKEND=postgres");
        }

        let generation = GenerationConfig {
            delay_ms: env_parse("GENERATION_DELAY_MS").unwrap_or(1500),
            timeout_ms: env_parse("GENERATION_TIMEOUT_MS").unwrap_or(10_000),
        };

        Ok(Self {
            storage,
            database_url,
            default_user_id: std::env::var("DEFAULT_USER_ID")
                .unwrap_or_else(|_| "local_user_12345".into()),
            generation,
            calorie_floor_kcal: env_parse("CALORIE_FLOOR_KCAL").unwrap_or(1200.0),
        })
    }

    pub fn for_tests() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            default_user_id: "local_user_12345".into(),
            generation: GenerationConfig {
                delay_ms: 0,
                timeout_ms: 2_000,
            },
            calorie_floor_kcal: 1200.0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
