use std::sync::Arc;

use nb_core::config::{is_plain_identifier, StoreBackend, StoreConfig};
use nb_core::{Error, NewsStore, Result};

pub mod backends;

pub use backends::*;

/// Opens the backend named in the config and makes sure its table exists.
pub async fn create_storage(config: &StoreConfig) -> Result<Arc<dyn NewsStore>> {
    if !is_plain_identifier(&config.table) {
        return Err(Error::Config(format!(
            "store.table must be a plain identifier, got {:?}",
            config.table
        )));
    }

    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStorage::new())),
        StoreBackend::Sqlite => open_sqlite(config).await,
        StoreBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(config: &StoreConfig) -> Result<Arc<dyn NewsStore>> {
    let storage =
        SQLiteStorage::connect(&config.url, &config.table, config.max_connections).await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_config: &StoreConfig) -> Result<Arc<dyn NewsStore>> {
    Err(Error::Config(
        "sqlite backend not compiled in, rebuild with the `sqlite` feature".to_string(),
    ))
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &StoreConfig) -> Result<Arc<dyn NewsStore>> {
    let storage =
        PostgresStorage::connect(&config.url, &config.table, config.max_connections).await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &StoreConfig) -> Result<Arc<dyn NewsStore>> {
    Err(Error::Config(
        "postgres backend not compiled in, rebuild with the `postgres` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_storage() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = create_storage(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_table_name() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            table: "ai_news--".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(create_storage(&config).await, Err(Error::Config(_))));
    }
}
