//! # Storage Traits
//!
//! The storage abstraction the domain layer works against, so the JSON file
//! store and the SQLite store can be used interchangeably.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{Bill, BillId};

use crate::domain::models::{BillField, BillUpdate};

/// Outcome of storing a newly created bill
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    Stored(Bill),
    /// Another bill already holds this id; nothing was written
    DuplicateId(BillId),
}

/// Trait defining the interface for bill storage operations
#[async_trait]
pub trait BillStorage: Send + Sync {
    /// Store a bill as-is; fails if its id is already taken
    async fn insert(&self, bill: &Bill) -> Result<()>;

    /// Store a newly created bill.
    ///
    /// With `assign_id` the bill receives the next numeric id, otherwise its
    /// own id is kept and must be free. Id assignment, the duplicate check and
    /// the write happen as one step, so concurrent creates never share an id.
    async fn insert_new(&self, bill: Bill, assign_id: bool) -> Result<Insertion>;

    /// All bills in insertion order
    async fn all(&self) -> Result<Vec<Bill>>;

    /// Retrieve a specific bill by ID
    async fn get_by_id(&self, id: &BillId) -> Result<Option<Bill>>;

    /// Merge a partial update into the stored bill
    /// Returns the updated bill, or None if no bill has this ID
    async fn update_by_id(&self, id: &BillId, update: &BillUpdate) -> Result<Option<Bill>>;

    /// Returns true if the bill was found and deleted
    async fn remove_by_id(&self, id: &BillId) -> Result<bool>;

    /// Delete every bill whose field equals `value`
    /// Returns the number of bills deleted
    async fn remove_by_field(&self, field: BillField, value: &str) -> Result<usize>;
}

/// One more than the largest numeric bill ID (1 for an empty store)
pub(crate) fn next_id_after<'a>(ids: impl Iterator<Item = &'a BillId>) -> Result<i64> {
    match ids.filter_map(BillId::as_numeric).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| anyhow!("No numeric bill id left after {}", max)),
    }
}
