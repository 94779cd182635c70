//! # Storage Layer
//!
//! Bill persistence behind the `BillStorage` trait. Two adapters exist: a
//! TinyDB-compatible JSON file and a SQLite database. The configuration
//! picks one at startup.

pub mod json;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{StorageBackend, StorageConfig};
pub use json::JsonBillRepository;
pub use sqlite::{DbConnection, SqliteBillRepository};
pub use traits::{BillStorage, Insertion};

/// Open the configured bill store
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn BillStorage>> {
    let storage: Arc<dyn BillStorage> = match config.backend {
        StorageBackend::Json => Arc::new(JsonBillRepository::new(&config.path)),
        StorageBackend::Sqlite => {
            let connection = DbConnection::open(&config.path).await?;
            Arc::new(SqliteBillRepository::new(connection))
        }
    };
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::sample_bill;
    use test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_open_each_backend() {
        let env = TestEnvironment::new().unwrap();

        for (backend, file) in [(StorageBackend::Json, "bills.json"), (StorageBackend::Sqlite, "bills.db")] {
            let config = StorageConfig {
                backend,
                path: env.base_path.join(file),
            };
            let storage = open_storage(&config).await.unwrap();
            storage.insert(&sample_bill(1, "Rent", 900.0, None, None)).await.unwrap();
            assert_eq!(storage.all().await.unwrap().len(), 1);
            assert!(config.path.exists());
        }
    }
}
