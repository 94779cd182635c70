//! Bill service domain logic: CRUD, reminders and categorization.
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use shared::{
    Bill, BillId, CategorizeAllResponse, ClassifyBillRequest, ClassifyBillResponse,
    CreateBillRequest, DeleteBillsResponse, UpdateBillRequest,
};
use tracing::{info, warn};

use crate::domain::canonicalizer::{canonicalize_new_bill, canonicalize_update, validate_requested_id};
use crate::domain::classifier::BillClassifier;
use crate::domain::error::{BillError, BillResult};
use crate::domain::models::{BillField, BillUpdate};
use crate::domain::reminders::upcoming_bills;
use crate::storage::traits::{BillStorage, Insertion};

pub const BILL_NOT_FOUND: &str = "Bill not found";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Clone)]
pub struct BillService {
    storage: Arc<dyn BillStorage>,
    classifier: BillClassifier,
    auto_categorize: bool,
}

impl BillService {
    pub fn new(storage: Arc<dyn BillStorage>, classifier: BillClassifier, auto_categorize: bool) -> Self {
        Self {
            storage,
            classifier,
            auto_categorize,
        }
    }

    pub async fn create_bill(&self, request: CreateBillRequest) -> BillResult<Bill> {
        let assign_id = request.id.is_none();
        // Without a requested id the store replaces this one on insert
        let id = request.id.clone().unwrap_or(BillId::Numeric(0));
        validate_requested_id(&id)?;

        let explicit_recurring = request.recurring.is_some();
        let mut bill = canonicalize_new_bill(request, id, today())?;

        if self.auto_categorize && bill.category.is_none() {
            let category = self.classifier.categorize(&bill.bill_name).await;
            bill.category = Some(category);
            if !explicit_recurring {
                bill.recurring = category.is_recurring_by_default();
            }
        }

        match self.storage.insert_new(bill, assign_id).await? {
            Insertion::Stored(bill) => {
                info!("Created bill {} ({})", bill.id, bill.bill_name);
                Ok(bill)
            }
            Insertion::DuplicateId(id) => Err(BillError::validation(format!(
                "Bill with id {} already exists",
                id
            ))),
        }
    }

    pub async fn list_bills(&self) -> BillResult<Vec<Bill>> {
        Ok(self.storage.all().await?)
    }

    pub async fn get_bill(&self, raw_id: &str) -> BillResult<Bill> {
        let id = BillId::parse(raw_id);
        self.storage
            .get_by_id(&id)
            .await?
            .ok_or_else(|| BillError::not_found(BILL_NOT_FOUND))
    }

    pub async fn update_bill(&self, raw_id: &str, request: UpdateBillRequest) -> BillResult<Bill> {
        let id = BillId::parse(raw_id);
        let existing = self
            .storage
            .get_by_id(&id)
            .await?
            .ok_or_else(|| BillError::not_found(BILL_NOT_FOUND))?;

        let update = canonicalize_update(request, &existing, today())?;
        if update.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .storage
            .update_by_id(&id, &update)
            .await?
            .ok_or_else(|| BillError::not_found(BILL_NOT_FOUND))?;
        info!("Updated bill {}", id);
        Ok(updated)
    }

    pub async fn delete_bill(&self, raw_id: Option<&str>) -> BillResult<()> {
        let raw_id = raw_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BillError::validation("Bill ID is required"))?;
        let id = BillId::parse(raw_id);

        if !self.storage.remove_by_id(&id).await? {
            return Err(BillError::not_found(BILL_NOT_FOUND));
        }
        info!("Deleted bill {}", id);
        Ok(())
    }

    /// Remove every bill with exactly this name
    pub async fn delete_bills_by_name(&self, bill_name: Option<&str>) -> BillResult<DeleteBillsResponse> {
        let bill_name = bill_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| BillError::validation("bill_name is required"))?;

        let deleted_count = self.storage.remove_by_field(BillField::Name, bill_name).await?;
        if deleted_count == 0 {
            return Err(BillError::not_found(format!("No bills found with name '{}'", bill_name)));
        }

        info!("Deleted {} bills named '{}'", deleted_count, bill_name);
        Ok(DeleteBillsResponse {
            message: format!("Deleted {} bill(s) named '{}'", deleted_count, bill_name),
            deleted_count,
        })
    }

    pub async fn upcoming_reminders(&self) -> BillResult<Vec<Bill>> {
        let bills = self.storage.all().await?;
        Ok(upcoming_bills(&bills, today()))
    }

    pub async fn classify_bill(&self, request: ClassifyBillRequest) -> BillResult<ClassifyBillResponse> {
        let bill_name = request
            .bill_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BillError::validation("bill_name is required"))?;

        let category = self.classifier.categorize(&bill_name).await;
        Ok(ClassifyBillResponse { bill_name, category })
    }

    /// Categorize every bill that has never been categorized
    pub async fn categorize_all(&self) -> BillResult<CategorizeAllResponse> {
        let bills = self.storage.all().await?;
        let mut updated_count = 0;
        let mut skipped_count = 0;

        for bill in bills.iter().filter(|bill| bill.category.is_none()) {
            let category = self.classifier.categorize(&bill.bill_name).await;
            match self.storage.update_by_id(&bill.id, &BillUpdate::category(category)).await {
                Ok(Some(_)) => updated_count += 1,
                Ok(None) => {
                    warn!("Bill {} disappeared before it could be categorized", bill.id);
                    skipped_count += 1;
                }
                Err(e) => {
                    warn!("Failed to store category for bill {}: {:#}", bill.id, e);
                    skipped_count += 1;
                }
            }
        }

        info!("Bulk categorization: {} updated, {} skipped", updated_count, skipped_count);
        Ok(CategorizeAllResponse {
            message: format!("Categorized {} bills", updated_count),
            updated_count,
            skipped_count,
        })
    }
}
