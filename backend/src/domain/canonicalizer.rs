//! # Bill Canonicalizer
//!
//! Turns loosely-typed create/update payloads into canonical `Bill` records:
//!
//! - `bill_name` must be present and non-blank, `amount` present, finite and non-negative
//! - richer due date encodings (calendar objects, Unix timestamps) become `YYYY-MM-DD`;
//!   textual due dates are kept as supplied
//! - category labels are coerced onto the fixed enumeration (unknown → `Other`)
//! - `paid` and `status` are kept in agreement
//! - `recurring` defaults by category

use chrono::{DateTime, NaiveDate};
use shared::{
    Bill, BillCategory, BillId, BillStatus, CreateBillRequest, DueDateInput, Payment,
    UpdateBillRequest,
};
use tracing::warn;

use crate::domain::due_date::{normalize_due_date, CANONICAL_DATE_FORMAT};
use crate::domain::error::{BillError, BillResult};
use crate::domain::models::BillUpdate;

/// Render a due date input as the string that gets stored
pub fn due_date_to_string(input: DueDateInput) -> BillResult<String> {
    match input {
        DueDateInput::Text(text) => Ok(text),
        DueDateInput::Calendar { year, month, day } => NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
            .ok_or_else(|| {
                BillError::validation(format!(
                    "Invalid due date: {:04}-{:02}-{:02}",
                    year, month, day
                ))
            }),
        DueDateInput::Timestamp(seconds) => DateTime::from_timestamp(seconds, 0)
            .map(|timestamp| timestamp.date_naive().format(CANONICAL_DATE_FORMAT).to_string())
            .ok_or_else(|| BillError::validation(format!("Invalid due date timestamp: {}", seconds))),
    }
}

fn validate_name(name: &str) -> BillResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BillError::validation("bill_name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_amount(amount: f64) -> BillResult<f64> {
    if !amount.is_finite() {
        return Err(BillError::validation("amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(BillError::validation("amount must not be negative"));
    }
    Ok(amount)
}

fn canonical_category(label: &str) -> BillCategory {
    let category = BillCategory::coerce(label);
    if category == BillCategory::Other && !label.trim().eq_ignore_ascii_case("other") {
        warn!("Unrecognized category '{}', using Other", label);
    }
    category
}

/// Status for an unpaid bill, judged against `today`
fn unpaid_status(due_date: Option<&str>, today: NaiveDate) -> BillStatus {
    match normalize_due_date(due_date).date() {
        Some(date) if date < today => BillStatus::Overdue,
        _ => BillStatus::Pending,
    }
}

/// Bring `paid` and `status` into agreement.
///
/// An explicit `paid` status wins and marks the bill paid; a paid bill gets
/// the `paid` status; an unpaid bill without a status gets one derived from
/// its due date. An explicit `pending`/`overdue` on an unpaid bill is kept.
pub fn reconcile_status(bill: &mut Bill, today: NaiveDate) {
    match (bill.paid, bill.status) {
        (_, Some(BillStatus::Paid)) => bill.paid = true,
        (true, _) => bill.status = Some(BillStatus::Paid),
        (false, Some(_)) => {}
        (false, None) => bill.status = Some(unpaid_status(bill.due_date.as_deref(), today)),
    }
}

fn check_payments(bill: &Bill) {
    if bill.payments.is_empty() {
        return;
    }
    if !bill.paid {
        warn!("Bill {} has payments recorded but is not marked paid", bill.id);
    }
    if !bill.payments_reconcile() {
        warn!(
            "Payments for bill {} total {:.2} but the bill amount is {:.2}",
            bill.id,
            bill.payments_total(),
            bill.amount
        );
    }
}

fn canonical_payments(payments: Vec<Payment>) -> BillResult<Vec<Payment>> {
    for payment in &payments {
        validate_amount(payment.amount)
            .map_err(|_| BillError::validation("payment amounts must be non-negative numbers"))?;
    }
    Ok(payments)
}

/// A client-chosen id must leave room for the ids assigned after it
pub fn validate_requested_id(id: &BillId) -> BillResult<()> {
    match id {
        BillId::Numeric(n) if *n == i64::MAX => {
            Err(BillError::validation(format!("Bill id {} is out of range", n)))
        }
        _ => Ok(()),
    }
}

/// Validate a create payload and fill defaults
pub fn canonicalize_new_bill(
    request: CreateBillRequest,
    id: BillId,
    today: NaiveDate,
) -> BillResult<Bill> {
    let bill_name = request
        .bill_name
        .as_deref()
        .ok_or_else(|| BillError::validation("bill_name is required"))
        .and_then(validate_name)?;
    let amount = request
        .amount
        .ok_or_else(|| BillError::validation("amount is required"))
        .and_then(validate_amount)?;
    let due_date = request.due_date.map(due_date_to_string).transpose()?;
    let category = request.category.as_deref().map(canonical_category);
    let recurring = request
        .recurring
        .unwrap_or_else(|| category.is_some_and(|c| c.is_recurring_by_default()));
    let payments = canonical_payments(request.payments.unwrap_or_default())?;

    let mut bill = Bill {
        id,
        bill_name,
        amount,
        due_date,
        category,
        paid: request.paid.unwrap_or(false),
        status: request.status,
        recurring,
        notes: request.notes,
        payments,
        billing_cycle: request.billing_cycle,
    };

    reconcile_status(&mut bill, today);
    check_payments(&bill);
    Ok(bill)
}

/// Validate an update payload against the bill it will be merged into
pub fn canonicalize_update(
    request: UpdateBillRequest,
    existing: &Bill,
    today: NaiveDate,
) -> BillResult<BillUpdate> {
    let touches_status = request.paid.is_some() || request.status.is_some();

    let mut update = BillUpdate {
        bill_name: request.bill_name.as_deref().map(validate_name).transpose()?,
        amount: request.amount.map(validate_amount).transpose()?,
        due_date: request.due_date.map(due_date_to_string).transpose()?,
        category: request.category.as_deref().map(canonical_category),
        paid: request.paid,
        status: request.status,
        recurring: request.recurring,
        notes: request.notes,
        payments: request.payments.map(canonical_payments).transpose()?,
        billing_cycle: request.billing_cycle,
    };

    let mut preview = existing.clone();
    if request.paid == Some(false) && request.status.is_none() {
        // Unpaying a bill drops its old status so a fresh one is derived
        preview.status = None;
    }
    update.apply_to(&mut preview);
    if touches_status {
        reconcile_status(&mut preview, today);
        update.paid = Some(preview.paid);
        update.status = preview.status;
    }
    check_payments(&preview);

    Ok(update)
}
