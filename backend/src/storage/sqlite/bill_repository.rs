//! Bills stored as JSON documents in a single SQLite table.
//!
//! `bill_key` holds the rendered bill id and `bill_name` is denormalized so
//! removal by name can run in SQL. `doc_id` preserves insertion order.
//! Creates are serialized so id assignment sees every earlier create.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{Bill, BillId};
use sqlx::Row;
use tokio::sync::Mutex;

use super::connection::DbConnection;
use crate::domain::models::{BillField, BillUpdate};
use crate::storage::traits::{next_id_after, BillStorage, Insertion};

#[derive(Clone)]
pub struct SqliteBillRepository {
    connection: DbConnection,
    create_lock: Arc<Mutex<()>>,
}

impl SqliteBillRepository {
    pub fn new(connection: DbConnection) -> Self {
        Self {
            connection,
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn next_numeric_id(&self) -> Result<i64> {
        let rows = sqlx::query("SELECT bill_key FROM bills")
            .fetch_all(self.connection.pool())
            .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<String, _>("bill_key").map(|key| BillId::parse(&key)))
            .collect::<Result<Vec<_>, _>>()?;
        next_id_after(ids.iter())
    }

    async fn write_new(&self, bill: &Bill) -> Result<()> {
        let document = serde_json::to_string(bill)?;
        sqlx::query("INSERT INTO bills (bill_key, bill_name, document) VALUES (?, ?, ?)")
            .bind(bill.id.to_string())
            .bind(&bill.bill_name)
            .bind(document)
            .execute(self.connection.pool())
            .await
            .with_context(|| format!("Failed to insert bill {}", bill.id))?;
        Ok(())
    }

    async fn id_taken(&self, id: &BillId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM bills WHERE bill_key = ?")
            .bind(id.to_string())
            .fetch_optional(self.connection.pool())
            .await?;
        Ok(row.is_some())
    }
}

fn decode(document: &str) -> Result<Bill> {
    serde_json::from_str(document).context("Failed to decode stored bill")
}

#[async_trait]
impl BillStorage for SqliteBillRepository {
    async fn insert(&self, bill: &Bill) -> Result<()> {
        let _guard = self.create_lock.lock().await;
        self.write_new(bill).await
    }

    async fn insert_new(&self, mut bill: Bill, assign_id: bool) -> Result<Insertion> {
        let _guard = self.create_lock.lock().await;

        if assign_id {
            bill.id = BillId::Numeric(self.next_numeric_id().await?);
        } else if self.id_taken(&bill.id).await? {
            return Ok(Insertion::DuplicateId(bill.id));
        }

        self.write_new(&bill).await?;
        Ok(Insertion::Stored(bill))
    }

    async fn all(&self) -> Result<Vec<Bill>> {
        let rows = sqlx::query("SELECT document FROM bills ORDER BY doc_id")
            .fetch_all(self.connection.pool())
            .await?;

        rows.iter()
            .map(|row| {
                let document: String = row.try_get("document")?;
                decode(&document)
            })
            .collect()
    }

    async fn get_by_id(&self, id: &BillId) -> Result<Option<Bill>> {
        let row = sqlx::query("SELECT document FROM bills WHERE bill_key = ?")
            .bind(id.to_string())
            .fetch_optional(self.connection.pool())
            .await?;

        match row {
            Some(r) => {
                let document: String = r.try_get("document")?;
                Ok(Some(decode(&document)?))
            }
            None => Ok(None),
        }
    }

    async fn update_by_id(&self, id: &BillId, update: &BillUpdate) -> Result<Option<Bill>> {
        let mut tx = self.connection.pool().begin().await?;

        let row = sqlx::query("SELECT document FROM bills WHERE bill_key = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let document: String = row.try_get("document")?;
        let mut bill = decode(&document)?;
        update.apply_to(&mut bill);

        sqlx::query("UPDATE bills SET bill_name = ?, document = ? WHERE bill_key = ?")
            .bind(&bill.bill_name)
            .bind(serde_json::to_string(&bill)?)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(bill))
    }

    async fn remove_by_id(&self, id: &BillId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bills WHERE bill_key = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_by_field(&self, field: BillField, value: &str) -> Result<usize> {
        let sql = format!("DELETE FROM bills WHERE {} = ?", field.column());
        let result = sqlx::query(&sql)
            .bind(value)
            .execute(self.connection.pool())
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
