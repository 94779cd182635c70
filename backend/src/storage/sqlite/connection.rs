use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::info;

/// DbConnection owns the SQLite pool behind the bill store
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to a database URL, creating the database if it doesn't exist
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url)
                .await
                .with_context(|| format!("Failed to create database {}", url))?;
        }

        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Using SQLite bill store at {}", path.display());
        Self::new(&format!("sqlite:{}", path.display())).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bills (
                doc_id INTEGER PRIMARY KEY AUTOINCREMENT,
                bill_key TEXT NOT NULL UNIQUE,
                bill_name TEXT NOT NULL,
                document TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create bills table")?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
