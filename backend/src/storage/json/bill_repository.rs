//! JSON file bill store.
//!
//! Uses the TinyDB document layout so existing data files keep working:
//!
//! ```json
//! {"_default": {"1": {"id": 1, "bill_name": "Rent", "amount": 1000.0}}}
//! ```
//!
//! Documents are kept ordered by their numeric document key. Every operation
//! is a read-modify-write cycle under one async mutex, and writes go to a
//! temporary file that is renamed over the original.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::{Bill, BillId};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::models::{BillField, BillUpdate};
use crate::storage::traits::{next_id_after, BillStorage, Insertion};

const DEFAULT_TABLE: &str = "_default";

type Documents = BTreeMap<u64, Bill>;

#[derive(Clone)]
pub struct JsonBillRepository {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonBillRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Using JSON bill store at {}", path.display());
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Documents> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Documents::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        if content.trim().is_empty() {
            return Ok(Documents::new());
        }

        let root: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        let Some(table) = root.get(DEFAULT_TABLE).and_then(Value::as_object) else {
            return Ok(Documents::new());
        };

        let mut documents = Documents::new();
        for (key, document) in table {
            let doc_id: u64 = key
                .parse()
                .with_context(|| format!("Invalid document key '{}'", key))?;

            let mut document = document.clone();
            let fields = document
                .as_object_mut()
                .ok_or_else(|| anyhow!("Document {} is not an object", key))?;
            // Documents written without an id field are addressed by their key
            fields.entry("id").or_insert_with(|| Value::from(doc_id));

            let bill: Bill = serde_json::from_value(document)
                .with_context(|| format!("Failed to decode document {}", key))?;
            documents.insert(doc_id, bill);
        }

        Ok(documents)
    }

    async fn save(&self, documents: &Documents) -> Result<()> {
        let mut table = Map::new();
        for (doc_id, bill) in documents {
            table.insert(doc_id.to_string(), serde_json::to_value(bill)?);
        }
        let mut root = Map::new();
        root.insert(DEFAULT_TABLE.to_string(), Value::Object(table));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&Value::Object(root))?;
        fs::write(&temp_path, content)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved {} bills to {}", documents.len(), self.path.display());
        Ok(())
    }
}

fn next_doc_id(documents: &Documents) -> u64 {
    documents.keys().next_back().map_or(1, |last| last + 1)
}

fn find_key(documents: &Documents, id: &BillId) -> Option<u64> {
    documents
        .iter()
        .find(|(_, bill)| bill.id == *id)
        .map(|(key, _)| *key)
}

#[async_trait]
impl BillStorage for JsonBillRepository {
    async fn insert(&self, bill: &Bill) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;
        if find_key(&documents, &bill.id).is_some() {
            bail!("Bill {} already exists", bill.id);
        }
        let doc_id = next_doc_id(&documents);
        documents.insert(doc_id, bill.clone());
        self.save(&documents).await
    }

    async fn insert_new(&self, mut bill: Bill, assign_id: bool) -> Result<Insertion> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;

        if assign_id {
            bill.id = BillId::Numeric(next_id_after(documents.values().map(|b| &b.id))?);
        } else if find_key(&documents, &bill.id).is_some() {
            return Ok(Insertion::DuplicateId(bill.id));
        }

        let doc_id = next_doc_id(&documents);
        documents.insert(doc_id, bill.clone());
        self.save(&documents).await?;
        Ok(Insertion::Stored(bill))
    }

    async fn all(&self) -> Result<Vec<Bill>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_values().collect())
    }

    async fn get_by_id(&self, id: &BillId) -> Result<Option<Bill>> {
        let _guard = self.lock.lock().await;
        let documents = self.load().await?;
        Ok(documents.into_values().find(|bill| bill.id == *id))
    }

    async fn update_by_id(&self, id: &BillId, update: &BillUpdate) -> Result<Option<Bill>> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;

        let Some(key) = find_key(&documents, id) else {
            return Ok(None);
        };
        let Some(bill) = documents.get_mut(&key) else {
            return Ok(None);
        };
        update.apply_to(bill);
        let updated = bill.clone();

        self.save(&documents).await?;
        Ok(Some(updated))
    }

    async fn remove_by_id(&self, id: &BillId) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;

        match find_key(&documents, id) {
            Some(key) => {
                documents.remove(&key);
                self.save(&documents).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_by_field(&self, field: BillField, value: &str) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;

        let before = documents.len();
        documents.retain(|_, bill| !field.matches(bill, value));
        let removed = before - documents.len();

        if removed > 0 {
            self.save(&documents).await?;
        }
        Ok(removed)
    }
}
