//! Upcoming-bill selection for reminders.

use chrono::NaiveDate;
use shared::Bill;
use tracing::warn;

use crate::domain::due_date::normalize_due_date;

/// Bills due today or later, in storage order.
///
/// Bills without a due date, or with one that cannot be parsed, are skipped
/// with a warning. Returned bills are not modified.
pub fn upcoming_bills(bills: &[Bill], today: NaiveDate) -> Vec<Bill> {
    bills
        .iter()
        .filter(|bill| {
            let Some(raw) = bill.due_date.as_deref() else {
                warn!("Skipping bill {} with no due date", bill.id);
                return false;
            };
            match normalize_due_date(Some(raw)).date() {
                Some(date) => date >= today,
                None => {
                    warn!("Skipping bill {} with unparseable due date '{}'", bill.id, raw);
                    false
                }
            }
        })
        .cloned()
        .collect()
}
