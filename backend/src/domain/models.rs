//! Domain-side companions to the shared `Bill` record.
use shared::{Bill, BillCategory, BillStatus, Payment};

/// Fields that bills can be matched on for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillField {
    Name,
}

impl BillField {
    /// Exact, case-sensitive comparison
    pub fn matches(&self, bill: &Bill, value: &str) -> bool {
        match self {
            BillField::Name => bill.bill_name == value,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            BillField::Name => "bill_name",
        }
    }
}

/// Canonicalized partial update; `None` leaves the stored field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillUpdate {
    pub bill_name: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
    pub category: Option<BillCategory>,
    pub paid: Option<bool>,
    pub status: Option<BillStatus>,
    pub recurring: Option<bool>,
    pub notes: Option<String>,
    pub payments: Option<Vec<Payment>>,
    pub billing_cycle: Option<String>,
}

impl BillUpdate {
    /// Category-only update, used by bulk categorization
    pub fn category(category: BillCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into a stored bill. The id is never changed.
    pub fn apply_to(&self, bill: &mut Bill) {
        if let Some(name) = &self.bill_name {
            bill.bill_name = name.clone();
        }
        if let Some(amount) = self.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = &self.due_date {
            bill.due_date = Some(due_date.clone());
        }
        if let Some(category) = self.category {
            bill.category = Some(category);
        }
        if let Some(paid) = self.paid {
            bill.paid = paid;
        }
        if let Some(status) = self.status {
            bill.status = Some(status);
        }
        if let Some(recurring) = self.recurring {
            bill.recurring = recurring;
        }
        if let Some(notes) = &self.notes {
            bill.notes = Some(notes.clone());
        }
        if let Some(payments) = &self.payments {
            bill.payments = payments.clone();
        }
        if let Some(cycle) = &self.billing_cycle {
            bill.billing_cycle = Some(cycle.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::sample_bill;

    #[test]
    fn test_apply_update_only_touches_supplied_fields() {
        let mut bill = sample_bill(1, "Electricity Bill", 120.0, Some(BillCategory::Utilities), Some("2025-05-01"));
        let update = BillUpdate {
            amount: Some(99.5),
            notes: Some("New provider".to_string()),
            ..BillUpdate::default()
        };

        update.apply_to(&mut bill);

        assert_eq!(bill.amount, 99.5);
        assert_eq!(bill.notes.as_deref(), Some("New provider"));
        assert_eq!(bill.bill_name, "Electricity Bill");
        assert_eq!(bill.category, Some(BillCategory::Utilities));
        assert_eq!(bill.due_date.as_deref(), Some("2025-05-01"));
    }

    #[test]
    fn test_field_matching_is_exact() {
        let bill = sample_bill(1, "Netflix (Monthly)", 15.99, None, None);

        assert!(BillField::Name.matches(&bill, "Netflix (Monthly)"));
        assert!(!BillField::Name.matches(&bill, "netflix (monthly)"));
        assert!(!BillField::Name.matches(&bill, "Netflix"));
    }

    #[test]
    fn test_empty_update() {
        assert!(BillUpdate::default().is_empty());
        assert!(!BillUpdate::category(BillCategory::Food).is_empty());
    }
}
